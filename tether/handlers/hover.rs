//! The hover track.
//!
//! Pointer movement is debounced; once the pointer rests, a hover request
//! fires for the resolved position. Nothing cancels the request in flight;
//! the response is validated on arrival instead: against the track's latest
//! issued generation, and against the pointer position at render time (the
//! reported hover range must still contain it).

use std::{
  sync::Arc,
  time::Duration,
};

use anyhow::Result;
use arc_swap::ArcSwap;
use serde_json::Value;
use tether_core::{
  Position,
  Range,
};
use tether_event::AsyncHook;
use tokio::time::Instant;

use crate::{
  adapter::{
    Shared,
    schedule_remeasure,
    spawn_detached,
  },
  config::Options,
  connection::Connection,
  overlay::{
    OverlayContent,
    OverlayKind,
  },
  protocol,
  surface::{
    EditorSurface,
    OverlayId,
    PixelPoint,
  },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverEvent {
  /// Debounced pointer rest over a token.
  Moved { pos: Position, point: PixelPoint },
  /// The pointer left the surface; drop any pending trigger.
  Cancel,
}

pub struct HoverHook<S, C> {
  shared:     Shared<S>,
  connection: Arc<C>,
  options:    Arc<ArcSwap<Options>>,
  pending:    Option<Position>,
}

impl<S: EditorSurface, C: Connection> HoverHook<S, C> {
  pub fn new(shared: Shared<S>, connection: Arc<C>, options: Arc<ArcSwap<Options>>) -> Self {
    Self {
      shared,
      connection,
      options,
      pending: None,
    }
  }
}

impl<S: EditorSurface, C: Connection> AsyncHook for HoverHook<S, C> {
  type Event = HoverEvent;

  fn handle_event(&mut self, event: Self::Event, _timeout: Option<Instant>) -> Option<Instant> {
    match event {
      HoverEvent::Moved { pos, .. } => {
        self.pending = Some(pos);
        let delay = self.options.load().hover_delay_ms;
        Some(Instant::now() + Duration::from_millis(delay))
      },
      HoverEvent::Cancel => {
        self.pending = None;
        None
      },
    }
  }

  fn finish_debounce(&mut self) {
    let Some(pos) = self.pending.take() else {
      return;
    };

    let generation = {
      let mut state = self.shared.lock();
      if state.removed {
        return;
      }
      state.hover.generation += 1;
      state.hover.generation
    };

    let shared = self.shared.clone();
    let connection = self.connection.clone();
    let options = self.options.clone();
    spawn_detached(async move {
      let result = connection.hover(pos).await;
      if let Some(id) = render_hover(&shared, &options, generation, result) {
        schedule_remeasure(&shared, id);
      }
    });
  }
}

fn render_hover<S: EditorSurface>(
  shared: &Shared<S>,
  options: &ArcSwap<Options>,
  generation: u64,
  result: Result<Value>,
) -> Option<OverlayId> {
  let mut state = shared.lock();
  if state.removed {
    return None;
  }
  if generation < state.hover.generation {
    log::debug!("discarding hover response behind generation {}", state.hover.generation);
    return None;
  }
  let options = options.load_full();
  if !options.enable_hover_info {
    return None;
  }

  let value = match result {
    Ok(value) => value,
    Err(err) => {
      log::warn!("hover request failed: {err}");
      return None;
    },
  };
  let hover = match protocol::parse_hover(&value) {
    Ok(hover) => hover,
    Err(err) => {
      log::debug!("ignoring malformed hover response: {err}");
      None
    },
  };
  let Some(hover) = hover else {
    // Nothing to show; drop any marker left from a previous hover.
    state.clear_hover_mark();
    state.close_overlay_of(OverlayKind::Tooltip);
    return None;
  };

  // Validate against where the pointer is now, not where it was when the
  // request was issued.
  let pointer = state.hover.last_pointer?;
  let Some(current_pos) = state.surface.position_at(pointer) else {
    state.clear_hover_mark();
    return None;
  };
  if let Some(range) = hover.range {
    if !range.contains(current_pos) {
      return None;
    }
  }

  let anchor = hover.range.unwrap_or(Range::point(current_pos));
  state.clear_hover_mark();
  if !anchor.is_empty() {
    let mark = state.surface.mark_range(anchor, &options.hover_mark_class);
    state.hover.marker = Some(mark);
  }
  let id = state.show_overlay(
    OverlayContent::Tooltip {
      text:      hover.text,
      is_markup: hover.is_markup,
    },
    anchor.start,
  );
  Some(id)
}
