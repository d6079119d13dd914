//! Positioning and lifecycle of the transient overlay surfaces.
//!
//! At most one overlay is mounted at any time; showing a new one unmounts
//! the previous one synchronously first. Placement happens in two phases:
//! an initial mount one line above the target, then, once the surface
//! reports the real rendered size on the next layout tick, a shift so the
//! bottom edge touches the target line, flipping below when the top would
//! leave the viewport. The placement math is a pure function so the flip
//! logic tests without a rendering surface.

use tether_core::Position;

use crate::{
  menu::MenuEntry,
  protocol::CompletionCandidate,
  surface::{
    EditorSurface,
    OverlayId,
    PixelPoint,
    PixelSize,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
  Tooltip,
  CompletionList,
  SignatureHelp,
  ContextMenu,
}

/// What the host renders inside a mounted overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
  Tooltip {
    text:      String,
    is_markup: bool,
  },
  CompletionList {
    items: Vec<CompletionCandidate>,
  },
  SignatureHelp {
    label:              String,
    documentation:      Option<String>,
    active_param_range: Option<(usize, usize)>,
  },
  ContextMenu {
    entries: Vec<MenuEntry>,
  },
}

impl OverlayContent {
  pub fn kind(&self) -> OverlayKind {
    match self {
      OverlayContent::Tooltip { .. } => OverlayKind::Tooltip,
      OverlayContent::CompletionList { .. } => OverlayKind::CompletionList,
      OverlayContent::SignatureHelp { .. } => OverlayKind::SignatureHelp,
      OverlayContent::ContextMenu { .. } => OverlayKind::ContextMenu,
    }
  }
}

#[derive(Debug)]
struct Mounted {
  id:     OverlayId,
  kind:   OverlayKind,
  /// Viewport-relative anchor the overlay is positioned against.
  anchor: PixelPoint,
}

/// Owner of the singleton overlay.
#[derive(Debug, Default)]
pub struct OverlayPresenter {
  mounted: Option<Mounted>,
}

impl OverlayPresenter {
  pub fn current(&self) -> Option<OverlayId> {
    self.mounted.as_ref().map(|mounted| mounted.id)
  }

  pub fn kind(&self) -> Option<OverlayKind> {
    self.mounted.as_ref().map(|mounted| mounted.kind)
  }

  /// Mount `content` anchored at buffer position `target`. Returns the new
  /// overlay's id; call [`OverlayPresenter::remeasure`] on the next layout
  /// tick to apply the final placement.
  pub fn show<S: EditorSurface>(
    &mut self,
    surface: &mut S,
    content: OverlayContent,
    target: Position,
  ) -> OverlayId {
    self.close(surface);

    let scroll = surface.scroll_offset();
    let local = surface.screen_point(target);
    let anchor = PixelPoint::new(local.x - scroll.x, local.y - scroll.y);
    let initial = PixelPoint::new(anchor.x, anchor.y - surface.line_height());

    let kind = content.kind();
    let id = surface.mount_overlay(&content, initial);
    self.mounted = Some(Mounted { id, kind, anchor });
    id
  }

  /// Second placement phase: once the rendered size is known, shift the
  /// overlay to its final position. A no-op when the overlay was replaced
  /// or closed in the meantime, or when layout has not run yet.
  pub fn remeasure<S: EditorSurface>(&mut self, surface: &mut S, id: OverlayId) {
    let Some(mounted) = &self.mounted else {
      return;
    };
    if mounted.id != id {
      return;
    }
    let Some(size) = surface.overlay_size(id) else {
      return;
    };
    let final_point = place_overlay(
      mounted.anchor,
      size,
      surface.viewport().height,
      surface.line_height(),
    );
    surface.reposition_overlay(id, final_point);
  }

  pub fn close<S: EditorSurface>(&mut self, surface: &mut S) {
    if let Some(mounted) = self.mounted.take() {
      surface.unmount_overlay(mounted.id);
    }
  }
}

/// Final overlay placement for a measured surface.
///
/// The overlay sits above the target with its bottom edge touching the
/// target line. When that would push its top above the viewport, it flips
/// to one line below the target instead, clamped so the bottom edge stays
/// inside the viewport.
pub fn place_overlay(
  target: PixelPoint,
  size: PixelSize,
  viewport_height: f32,
  line_height: f32,
) -> PixelPoint {
  let above = target.y - size.height;
  if above >= 0.0 {
    return PixelPoint::new(target.x, above);
  }
  let below = target.y + line_height;
  let max_top = (viewport_height - size.height).max(0.0);
  PixelPoint::new(target.x, below.min(max_top))
}
