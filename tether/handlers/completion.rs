//! The completion track.
//!
//! A typed word character triggers an Invoked request after the configured
//! quiet period; a registered trigger character fires almost immediately.
//! The router stores the extracted `TokenInfo` before the request goes out;
//! the response ranks against whatever token is current when it arrives and
//! is dropped entirely when a newer request has been issued since.

use std::{
  sync::Arc,
  time::Duration,
};

use anyhow::Result;
use arc_swap::ArcSwap;
use serde_json::Value;
use tether_core::{
  Position,
  ranking::{
    self,
    Candidate,
  },
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
  connection::{
    Connection,
    TriggerKind,
  },
  overlay::{
    OverlayContent,
    OverlayKind,
  },
  protocol::{
    self,
    CompletionCandidate,
  },
  surface::{
    EditorSurface,
    OverlayId,
  },
};

/// Quiet period for trigger-character requests (much shorter than the
/// typing debounce).
const TRIGGER_CHAR_DEBOUNCE: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
  /// A word character was typed.
  AutoTrigger { pos: Position },
  /// A server-registered completion trigger character was typed.
  TriggerChar { pos: Position, ch: String },
  /// Invalidate any pending trigger.
  Cancel,
}

#[derive(Debug, Clone)]
struct PendingTrigger {
  pos:          Position,
  trigger_char: Option<String>,
  kind:         TriggerKind,
}

pub struct CompletionHook<S, C> {
  shared:     Shared<S>,
  connection: Arc<C>,
  options:    Arc<ArcSwap<Options>>,
  pending:    Option<PendingTrigger>,
}

impl<S: EditorSurface, C: Connection> CompletionHook<S, C> {
  pub fn new(shared: Shared<S>, connection: Arc<C>, options: Arc<ArcSwap<Options>>) -> Self {
    Self {
      shared,
      connection,
      options,
      pending: None,
    }
  }
}

impl<S: EditorSurface, C: Connection> AsyncHook for CompletionHook<S, C> {
  type Event = CompletionEvent;

  fn handle_event(&mut self, event: Self::Event, _timeout: Option<Instant>) -> Option<Instant> {
    match event {
      CompletionEvent::AutoTrigger { pos } => {
        self.pending = Some(PendingTrigger {
          pos,
          trigger_char: None,
          kind: TriggerKind::Invoked,
        });
        let options = self.options.load();
        if options.debounce_suggestions_while_typing {
          Some(Instant::now() + Duration::from_millis(options.quick_suggestions_delay_ms))
        } else {
          self.finish_debounce();
          None
        }
      },
      CompletionEvent::TriggerChar { pos, ch } => {
        self.pending = Some(PendingTrigger {
          pos,
          trigger_char: Some(ch),
          kind: TriggerKind::TriggerCharacter,
        });
        Some(Instant::now() + TRIGGER_CHAR_DEBOUNCE)
      },
      CompletionEvent::Cancel => {
        self.pending = None;
        None
      },
    }
  }

  fn finish_debounce(&mut self) {
    let Some(trigger) = self.pending.take() else {
      return;
    };

    let (generation, token_text) = {
      let mut state = self.shared.lock();
      if state.removed {
        return;
      }
      state.completion.generation += 1;
      let text = state
        .pending_token
        .as_ref()
        .map(|token| token.text.clone())
        .unwrap_or_default();
      (state.completion.generation, text)
    };

    let shared = self.shared.clone();
    let connection = self.connection.clone();
    let options = self.options.clone();
    spawn_detached(async move {
      let result = connection
        .completion(trigger.pos, token_text, trigger.trigger_char, trigger.kind)
        .await;
      if let Some(id) = render_completions(&shared, &options, generation, result) {
        schedule_remeasure(&shared, id);
      }
    });
  }
}

/// A rankable candidate: a server completion or a configured snippet. Only
/// snippets survive an exact label match.
struct RankEntry {
  candidate: CompletionCandidate,
  snippet:   bool,
}

impl Candidate for RankEntry {
  fn label(&self) -> &str {
    &self.candidate.label
  }

  fn filter_text(&self) -> Option<&str> {
    self.candidate.filter_text.as_deref()
  }

  fn allows_exact_match(&self) -> bool {
    self.snippet
  }
}

fn render_completions<S: EditorSurface>(
  shared: &Shared<S>,
  options: &ArcSwap<Options>,
  generation: u64,
  result: Result<Value>,
) -> Option<OverlayId> {
  let mut state = shared.lock();
  if state.removed {
    return None;
  }
  if generation < state.completion.generation {
    log::debug!(
      "discarding completion response behind generation {}",
      state.completion.generation
    );
    return None;
  }
  let options = options.load_full();
  if !options.suggest {
    return None;
  }

  let value = match result {
    Ok(value) => value,
    Err(err) => {
      log::warn!("completion request failed: {err}");
      return None;
    },
  };
  let candidates = match protocol::parse_completions(&value) {
    Ok(candidates) => candidates,
    Err(err) => {
      log::debug!("ignoring malformed completion response: {err}");
      return None;
    },
  };

  // The most recently stored pending token; the ranker filters against the
  // text typed so far.
  let token = state.pending_token.clone()?;

  let entries: Vec<RankEntry> = candidates
    .into_iter()
    .map(|candidate| {
      RankEntry {
        candidate,
        snippet: false,
      }
    })
    .chain(options.snippets.iter().map(|snippet| {
      RankEntry {
        candidate: CompletionCandidate {
          label:       snippet.label.clone(),
          filter_text: None,
          insert_text: Some(snippet.body.clone()),
          detail:      None,
          kind:        None,
        },
        snippet: true,
      }
    }))
    .collect();

  let ranked = ranking::rank(&token.text, entries);
  if ranked.is_empty() {
    state.close_overlay_of(OverlayKind::CompletionList);
    return None;
  }

  let items: Vec<CompletionCandidate> = ranked.into_iter().map(|entry| entry.candidate).collect();
  let id = state.show_overlay(OverlayContent::CompletionList { items }, token.start);
  Some(id)
}
