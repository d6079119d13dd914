//! The signature help track.
//!
//! Typing a signature trigger character (usually `(` or `,`) requests the
//! active signature after the quiet period. The card closes on a cleared
//! line, on non-trigger punctuation, and whenever another overlay takes its
//! place.

use std::{
  sync::Arc,
  time::Duration,
};

use anyhow::Result;
use arc_swap::ArcSwap;
use serde_json::Value;
use tether_core::Position;
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
  },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignatureEvent {
  /// A signature trigger character was typed at `pos`.
  Trigger { pos: Position },
  /// Invalidate any pending trigger.
  Cancel,
}

pub struct SignatureHook<S, C> {
  shared:     Shared<S>,
  connection: Arc<C>,
  options:    Arc<ArcSwap<Options>>,
  pending:    Option<Position>,
}

impl<S: EditorSurface, C: Connection> SignatureHook<S, C> {
  pub fn new(shared: Shared<S>, connection: Arc<C>, options: Arc<ArcSwap<Options>>) -> Self {
    Self {
      shared,
      connection,
      options,
      pending: None,
    }
  }
}

impl<S: EditorSurface, C: Connection> AsyncHook for SignatureHook<S, C> {
  type Event = SignatureEvent;

  fn handle_event(&mut self, event: Self::Event, _timeout: Option<Instant>) -> Option<Instant> {
    match event {
      SignatureEvent::Trigger { pos } => {
        let options = self.options.load();
        if !options.enable_signatures {
          return None;
        }
        self.pending = Some(pos);
        Some(Instant::now() + Duration::from_millis(options.quick_suggestions_delay_ms))
      },
      SignatureEvent::Cancel => {
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
      state.signature.generation += 1;
      state.signature.generation
    };

    let shared = self.shared.clone();
    let connection = self.connection.clone();
    let options = self.options.clone();
    spawn_detached(async move {
      let result = connection.signature_help(pos).await;
      if let Some(id) = render_signature(&shared, &options, generation, pos, result) {
        schedule_remeasure(&shared, id);
      }
    });
  }
}

fn render_signature<S: EditorSurface>(
  shared: &Shared<S>,
  options: &ArcSwap<Options>,
  generation: u64,
  pos: Position,
  result: Result<Value>,
) -> Option<OverlayId> {
  let mut state = shared.lock();
  if state.removed {
    return None;
  }
  if generation < state.signature.generation {
    log::debug!(
      "discarding signature response behind generation {}",
      state.signature.generation
    );
    return None;
  }
  let options = options.load_full();
  if !options.enable_signatures {
    return None;
  }

  let value = match result {
    Ok(value) => value,
    Err(err) => {
      log::warn!("signature help request failed: {err}");
      return None;
    },
  };
  let info = match protocol::parse_signature_help(&value) {
    Ok(info) => info,
    Err(err) => {
      log::debug!("ignoring malformed signature response: {err}");
      None
    },
  };
  let Some(info) = info else {
    state.close_overlay_of(OverlayKind::SignatureHelp);
    return None;
  };

  let id = state.show_overlay(
    OverlayContent::SignatureHelp {
      label:              info.label,
      documentation:      info.documentation,
      active_param_range: info.active_param_range,
    },
    pos,
  );
  Some(id)
}
