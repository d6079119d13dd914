//! The abstract editor surface the adapter renders onto.
//!
//! The adapter never touches a widget directly: the embedding editor
//! implements [`EditorSurface`] and owns buffer storage, rendering, and hit
//! testing. Decoration and overlay operations return opaque handles so the
//! adapter can later remove exactly what it created.

use tether_core::{
  Position,
  Range,
};

use crate::overlay::OverlayContent;

/// A point in the editor's local pixel space. Pointer events and overlay
/// geometry are viewport-relative; [`EditorSurface::screen_point`] returns
/// content coordinates that still include scrolling.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PixelPoint {
  pub x: f32,
  pub y: f32,
}

impl PixelPoint {
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PixelSize {
  pub width:  f32,
  pub height: f32,
}

impl PixelSize {
  pub fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  pub fn contains(&self, point: PixelPoint) -> bool {
    point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
  }
}

/// Handle for a marked (styled) text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(pub u64);

/// Handle for a gutter marker on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GutterId(pub u64);

/// Handle for a mounted overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// Editor-side event classes the adapter subscribes to. `GlobalPointerDown`
/// is the document-level listener backing outside-click overlay dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
  Change,
  Refresh,
  Scroll,
  FocusGained,
  FocusLost,
  PointerMove,
  PointerLeave,
  ContextMenu,
  GlobalPointerDown,
}

/// Events the host forwards into [`Adapter::handle_event`].
///
/// [`Adapter::handle_event`]: crate::Adapter::handle_event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
  Changed,
  Refreshed,
  Scrolled,
  FocusGained,
  FocusLost,
  PointerMoved(PixelPoint),
  PointerLeft,
  ContextRequested(PixelPoint),
  ClickedOutsideOverlay,
}

/// Disposer token returned by a subscription. Dropping or disposing it
/// deregisters the listener; the adapter invokes its tokens in registration
/// order on teardown.
pub struct Subscription {
  dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
  pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
    Self {
      dispose: Some(Box::new(dispose)),
    }
  }

  /// A subscription with nothing to undo.
  pub fn noop() -> Self {
    Self { dispose: None }
  }

  pub fn dispose(mut self) {
    if let Some(dispose) = self.dispose.take() {
      dispose();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(dispose) = self.dispose.take() {
      dispose();
    }
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("live", &self.dispose.is_some())
      .finish()
  }
}

pub trait EditorSurface: Send + 'static {
  /// Full buffer text.
  fn text(&self) -> String;

  /// Text of a single line, without its line ending.
  fn line(&self, line: u32) -> Option<String>;

  /// Current cursor position, re-derived fresh on every call.
  fn cursor(&self) -> Position;

  /// Buffer position under a viewport-relative point, if it hits text.
  fn position_at(&self, point: PixelPoint) -> Option<Position>;

  /// Content-space pixel coordinates of a buffer position (scroll not yet
  /// subtracted).
  fn screen_point(&self, pos: Position) -> PixelPoint;

  fn scroll_offset(&self) -> PixelPoint;

  fn line_height(&self) -> f32;

  /// Size of the visible viewport, in the same space as pointer events.
  fn viewport(&self) -> PixelSize;

  fn mark_range(&mut self, range: Range, class: &str) -> MarkId;

  fn clear_mark(&mut self, mark: MarkId);

  fn set_gutter_mark(&mut self, line: u32, message: &str) -> GutterId;

  fn clear_gutter_mark(&mut self, mark: GutterId);

  fn mount_overlay(&mut self, content: &OverlayContent, at: PixelPoint) -> OverlayId;

  /// Rendered size of a mounted overlay, once layout has run. `None` until
  /// the first paint.
  fn overlay_size(&self, overlay: OverlayId) -> Option<PixelSize>;

  fn reposition_overlay(&mut self, overlay: OverlayId, to: PixelPoint);

  fn unmount_overlay(&mut self, overlay: OverlayId);

  /// Whether a viewport-relative point falls inside a mounted overlay.
  fn overlay_contains(&self, overlay: OverlayId, point: PixelPoint) -> bool;

  fn scroll_to(&mut self, pos: Position);

  /// Register interest in an event class. The host forwards matching events
  /// to [`Adapter::handle_event`] until the returned token is disposed.
  ///
  /// [`Adapter::handle_event`]: crate::Adapter::handle_event
  fn subscribe(&mut self, kind: SurfaceEventKind) -> Subscription;
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{
      AtomicBool,
      Ordering,
    },
  };

  use super::*;

  #[test]
  fn subscription_disposes_once() {
    let fired = Arc::new(AtomicBool::new(false));
    let flag = fired.clone();
    let sub = Subscription::new(move || flag.store(true, Ordering::SeqCst));
    sub.dispose();
    assert!(fired.load(Ordering::SeqCst));
  }

  #[test]
  fn subscription_disposes_on_drop() {
    let fired = Arc::new(AtomicBool::new(false));
    let flag = fired.clone();
    drop(Subscription::new(move || flag.store(true, Ordering::SeqCst)));
    assert!(fired.load(Ordering::SeqCst));
  }

  #[test]
  fn viewport_containment() {
    let viewport = PixelSize::new(100.0, 50.0);
    assert!(viewport.contains(PixelPoint::new(0.0, 0.0)));
    assert!(viewport.contains(PixelPoint::new(100.0, 50.0)));
    assert!(!viewport.contains(PixelPoint::new(101.0, 10.0)));
    assert!(!viewport.contains(PixelPoint::new(10.0, -1.0)));
  }
}
