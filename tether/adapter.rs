//! The event router and request coordinator.
//!
//! One [`Adapter`] instance pairs one editor surface with one protocol
//! connection. It is the single state holder: editor events come in through
//! [`Adapter::handle_event`], get debounced on the per-track hooks, turn
//! into protocol requests, and the asynchronous responses re-validate
//! against current state before mutating decorations or overlays. All
//! decorations and overlay surfaces created here are owned exclusively by
//! this instance and are torn down by [`Adapter::remove`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;
use tether_core::{
  Position,
  Range,
  TokenInfo,
  chars::char_is_word,
  token::extract_token,
};
use tether_event::{
  AsyncHook,
  send_blocking,
};
use tokio::sync::mpsc::Sender;

use crate::{
  config::Options,
  connection::{
    Connection,
    GotoKind,
  },
  diagnostics::DiagnosticsTracker,
  handlers::{
    CompletionEvent,
    CompletionHook,
    HoverEvent,
    HoverHook,
    SignatureEvent,
    SignatureHook,
  },
  highlight::HighlightSet,
  menu::{
    self,
    MenuEntry,
  },
  overlay::{
    OverlayContent,
    OverlayKind,
    OverlayPresenter,
  },
  protocol,
  surface::{
    EditorSurface,
    MarkId,
    OverlayId,
    PixelPoint,
    Subscription,
    SurfaceEvent,
    SurfaceEventKind,
  },
};

pub(crate) type Shared<S> = Arc<Mutex<State<S>>>;

#[derive(Debug, Default)]
pub(crate) struct HoverTrack {
  /// Position of the last issued (or enqueued) hover request, for
  /// duplicate suppression while the pointer is stationary.
  pub last_pos:     Option<Position>,
  /// Where the pointer is right now; responses validate against this.
  pub last_pointer: Option<PixelPoint>,
  pub marker:       Option<MarkId>,
  pub generation:   u64,
}

#[derive(Debug, Default)]
pub(crate) struct CompletionTrack {
  pub generation: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SignatureTrack {
  pub generation: u64,
}

#[derive(Debug)]
pub(crate) struct OpenMenu {
  pub entries: Vec<MenuEntry>,
  pub target:  Position,
}

/// Everything the response tasks need to see. Locked for the duration of a
/// single event or render step, never across an await.
pub(crate) struct State<S> {
  pub surface:       S,
  pub options:       Arc<ArcSwap<Options>>,
  pub overlay:       OverlayPresenter,
  pub diagnostics:   DiagnosticsTracker,
  pub highlights:    HighlightSet,
  /// The token being completed; owned transiently between a triggering
  /// keystroke and the matching response. Overwritten, never queued.
  pub pending_token: Option<TokenInfo>,
  pub hover:         HoverTrack,
  pub completion:    CompletionTrack,
  pub signature:     SignatureTrack,
  pub menu:          Option<OpenMenu>,
  pub removed:       bool,
}

impl<S: EditorSurface> State<S> {
  pub(crate) fn close_overlay(&mut self) {
    let Self {
      surface,
      overlay,
      menu,
      ..
    } = self;
    overlay.close(surface);
    *menu = None;
  }

  pub(crate) fn close_overlay_of(&mut self, kind: OverlayKind) {
    if self.overlay.kind() == Some(kind) {
      self.close_overlay();
    }
  }

  pub(crate) fn show_overlay(&mut self, content: OverlayContent, target: Position) -> OverlayId {
    let Self {
      surface,
      overlay,
      menu,
      ..
    } = self;
    *menu = None;
    overlay.show(surface, content, target)
  }

  pub(crate) fn remeasure_overlay(&mut self, id: OverlayId) {
    let Self {
      surface, overlay, ..
    } = self;
    overlay.remeasure(surface, id);
  }

  pub(crate) fn clear_hover_mark(&mut self) {
    if let Some(mark) = self.hover.marker.take() {
      self.surface.clear_mark(mark);
    }
  }

  /// Cheap invalidation: hover marker, overlay, and duplicate-suppression
  /// state all go at once, without waiting for any response.
  pub(crate) fn drop_hover_ui(&mut self) {
    self.clear_hover_mark();
    self.close_overlay();
    self.hover.last_pos = None;
  }

  pub(crate) fn clear_highlights(&mut self) {
    let Self {
      surface,
      highlights,
      ..
    } = self;
    highlights.clear(surface);
  }

  pub(crate) fn set_highlights(&mut self, ranges: &[Range], class: &str) {
    let Self {
      surface,
      highlights,
      ..
    } = self;
    highlights.replace(surface, ranges, class);
  }

  pub(crate) fn apply_diagnostics(&mut self, diagnostics: &[protocol::Diagnostic]) {
    let options = self.options.load_full();
    let Self {
      surface,
      diagnostics: tracker,
      ..
    } = self;
    tracker.publish(surface, &options, diagnostics);
  }

  pub(crate) fn clear_diagnostics(&mut self) {
    let Self {
      surface,
      diagnostics,
      ..
    } = self;
    diagnostics.clear(surface);
  }

  pub(crate) fn clear_gutter_marks(&mut self) {
    let Self {
      surface,
      diagnostics,
      ..
    } = self;
    diagnostics.clear_gutter(surface);
  }
}

/// Spawn a background task when a tokio runtime is available; otherwise
/// drop the work (the embedding application owns the runtime).
pub(crate) fn spawn_detached<F>(future: F)
where
  F: Future<Output = ()> + Send + 'static,
{
  match tokio::runtime::Handle::try_current() {
    Ok(handle) => {
      handle.spawn(future);
    },
    Err(_) => {
      log::debug!("no tokio runtime; dropping adapter background task");
    },
  }
}

/// Re-run overlay placement on the next tick, once the host has laid the
/// surface out and can report its rendered size.
pub(crate) fn schedule_remeasure<S: EditorSurface>(shared: &Shared<S>, id: OverlayId) {
  let shared = Arc::clone(shared);
  spawn_detached(async move {
    tokio::task::yield_now().await;
    let mut state = shared.lock();
    if state.removed {
      return;
    }
    state.remeasure_overlay(id);
  });
}

struct TrackSenders {
  hover:      Sender<HoverEvent>,
  completion: Sender<CompletionEvent>,
  signature:  Sender<SignatureEvent>,
}

pub struct Adapter<S: EditorSurface, C: Connection> {
  shared:        Shared<S>,
  connection:    Arc<C>,
  options:       Arc<ArcSwap<Options>>,
  /// `None` once removed; dropping the senders winds the hook tasks down.
  hooks:         Option<TrackSenders>,
  /// Disposed in registration order on removal.
  subscriptions: Vec<Subscription>,
}

impl<S: EditorSurface, C: Connection> Adapter<S, C> {
  pub fn new(mut surface: S, connection: Arc<C>, options: Options) -> Self {
    let options = Arc::new(ArcSwap::from_pointee(options));

    let mut subscriptions = Vec::new();
    for kind in [
      SurfaceEventKind::Change,
      SurfaceEventKind::Refresh,
      SurfaceEventKind::Scroll,
      SurfaceEventKind::FocusGained,
      SurfaceEventKind::FocusLost,
      SurfaceEventKind::PointerMove,
      SurfaceEventKind::PointerLeave,
      SurfaceEventKind::ContextMenu,
      SurfaceEventKind::GlobalPointerDown,
    ] {
      subscriptions.push(surface.subscribe(kind));
    }
    subscriptions.push(connection.subscribe_diagnostics());

    let shared = Arc::new(Mutex::new(State {
      surface,
      options: options.clone(),
      overlay: OverlayPresenter::default(),
      diagnostics: DiagnosticsTracker::default(),
      highlights: HighlightSet::default(),
      pending_token: None,
      hover: HoverTrack::default(),
      completion: CompletionTrack::default(),
      signature: SignatureTrack::default(),
      menu: None,
      removed: false,
    }));

    let hooks = TrackSenders {
      hover:      HoverHook::new(shared.clone(), connection.clone(), options.clone()).spawn(),
      completion: CompletionHook::new(shared.clone(), connection.clone(), options.clone()).spawn(),
      signature:  SignatureHook::new(shared.clone(), connection.clone(), options.clone()).spawn(),
    };

    Self {
      shared,
      connection,
      options,
      hooks: Some(hooks),
      subscriptions,
    }
  }

  /// Entry point for every editor-side event the adapter subscribed to.
  pub fn handle_event(&self, event: SurfaceEvent) {
    let Some(hooks) = &self.hooks else {
      return;
    };
    let mut state = self.shared.lock();
    if state.removed {
      return;
    }

    match event {
      SurfaceEvent::Changed => self.on_change(&mut state, hooks),
      SurfaceEvent::Refreshed | SurfaceEvent::Scrolled | SurfaceEvent::FocusLost => {
        state.drop_hover_ui();
      },
      SurfaceEvent::FocusGained => state.clear_highlights(),
      SurfaceEvent::PointerMoved(point) => self.on_pointer(&mut state, hooks, point),
      SurfaceEvent::PointerLeft => {
        send_blocking(&hooks.hover, HoverEvent::Cancel);
        state.drop_hover_ui();
      },
      SurfaceEvent::ContextRequested(point) => self.on_context_menu(&mut state, point),
      SurfaceEvent::ClickedOutsideOverlay => state.close_overlay(),
    }
  }

  /// One `publishDiagnostics` push. Publications are snapshots: the
  /// previous marks are discarded and rebuilt every time.
  pub fn publish_diagnostics(&self, params: &Value) {
    let published = match protocol::parse_publish_diagnostics(Some(params)) {
      Ok(published) => published,
      Err(err) => {
        log::warn!("ignoring malformed diagnostics publication: {err}");
        return;
      },
    };

    let mut state = self.shared.lock();
    if state.removed {
      return;
    }
    if published.uri != self.connection.document_uri() {
      log::debug!("dropping diagnostics for foreign document {}", published.uri);
      return;
    }
    state.apply_diagnostics(&published.diagnostics);
  }

  /// Dispatch the action of an open context-menu entry (built-in menu or a
  /// `context_menu_provider` rendering of the same entries).
  pub fn select_menu_entry(&self, index: usize) {
    let picked = {
      let mut state = self.shared.lock();
      if state.removed {
        return;
      }
      let Some(menu) = &state.menu else {
        return;
      };
      let Some(entry) = menu.entries.get(index) else {
        return;
      };
      let picked = (entry.kind, menu.target);
      state.close_overlay();
      picked
    };
    self.request_goto_at(picked.0, picked.1);
  }

  /// Explicitly close whatever overlay is open.
  pub fn close_overlay(&self) {
    let mut state = self.shared.lock();
    if state.removed {
      return;
    }
    state.close_overlay();
  }

  /// Navigation request at the current cursor, outside the menu flow.
  pub fn request_goto(&self, kind: GotoKind) {
    let pos = {
      let state = self.shared.lock();
      if state.removed {
        return;
      }
      state.surface.cursor()
    };
    self.request_goto_at(kind, pos);
  }

  /// Replace the options snapshot. Fields the caller left at their defaults
  /// replace previous values like any other; when diagnostics or gutter
  /// marks just became disabled their overlays are cleared immediately.
  pub fn update_options(&self, options: Options) {
    let previous = self.options.swap(Arc::new(options));
    let current = self.options.load_full();

    let mut state = self.shared.lock();
    if state.removed {
      return;
    }
    if previous.enable_diagnostics && !current.enable_diagnostics {
      state.clear_diagnostics();
    } else if previous.enable_gutter_marks && !current.enable_gutter_marks {
      state.clear_gutter_marks();
    }
  }

  /// Tear the adapter down: dispose every subscription in registration
  /// order, clear all decorations and overlays, and stop the track hooks.
  /// Responses still in flight become no-ops.
  pub fn remove(&mut self) {
    for subscription in self.subscriptions.drain(..) {
      subscription.dispose();
    }
    self.hooks = None;

    let mut state = self.shared.lock();
    state.clear_hover_mark();
    state.close_overlay();
    state.clear_diagnostics();
    state.clear_highlights();
    state.pending_token = None;
    state.removed = true;
  }

  fn on_change(&self, state: &mut State<S>, hooks: &TrackSenders) {
    // The raw change notification goes out regardless of the branch below.
    self.connection.notify_change();

    let pos = state.surface.cursor();
    let line = state.surface.line(pos.line).unwrap_or_default();
    let prev = pos
      .ch
      .checked_sub(1)
      .and_then(|idx| line.chars().nth(idx as usize));

    let completion_triggers = self.connection.completion_triggers();
    let signature_triggers = self.connection.signature_triggers();

    match prev {
      None => {
        // Line was cleared.
        state.pending_token = None;
        send_blocking(&hooks.signature, SignatureEvent::Cancel);
        send_blocking(&hooks.completion, CompletionEvent::Cancel);
        state.close_overlay_of(OverlayKind::SignatureHelp);
        state.close_overlay_of(OverlayKind::CompletionList);
      },
      Some(ch) if is_trigger(&completion_triggers, ch) => {
        state.pending_token = extract_token(&line, pos, &completion_triggers);
        send_blocking(&hooks.completion, CompletionEvent::TriggerChar {
          pos,
          ch: ch.to_string(),
        });
      },
      Some(ch) if is_trigger(&signature_triggers, ch) => {
        state.pending_token = extract_token(&line, pos, &signature_triggers);
        send_blocking(&hooks.signature, SignatureEvent::Trigger { pos });
      },
      Some(ch) if char_is_word(ch) => {
        send_blocking(&hooks.completion, CompletionEvent::AutoTrigger { pos });
        let mut union = completion_triggers;
        union.extend(signature_triggers);
        state.pending_token = extract_token(&line, pos, &union);
      },
      Some(_) => {
        // Punctuation or whitespace outside every trigger set.
        state.pending_token = None;
        send_blocking(&hooks.completion, CompletionEvent::Cancel);
        state.close_overlay_of(OverlayKind::SignatureHelp);
        state.close_overlay_of(OverlayKind::CompletionList);
      },
    }
  }

  fn on_pointer(&self, state: &mut State<S>, hooks: &TrackSenders, point: PixelPoint) {
    state.hover.last_pointer = Some(point);

    if !state.surface.viewport().contains(point) {
      // Outside the visible bounds: tear down immediately, not debounced.
      state.drop_hover_ui();
      return;
    }
    if !self.options.load().enable_hover_info {
      return;
    }
    if let Some(id) = state.overlay.current() {
      if state.surface.overlay_contains(id, point) {
        return;
      }
    }
    let Some(pos) = state.surface.position_at(point) else {
      return;
    };
    if !is_over_token(state, pos) {
      return;
    }
    if state.hover.last_pos == Some(pos) {
      return;
    }
    state.hover.last_pos = Some(pos);
    send_blocking(&hooks.hover, HoverEvent::Moved { pos, point });
  }

  fn on_context_menu(&self, state: &mut State<S>, point: PixelPoint) {
    let options = self.options.load_full();
    if !options.enable_context_menu {
      return;
    }
    let Some(pos) = state.surface.position_at(point) else {
      return;
    };
    if !is_over_token(state, pos) {
      return;
    }
    let entries = menu::entries_for(self.connection.as_ref());
    if entries.is_empty() {
      return;
    }

    if let Some(provider) = &options.context_menu_provider {
      state.close_overlay();
      state.menu = Some(OpenMenu {
        entries: entries.clone(),
        target:  pos,
      });
      provider(point, &entries);
      return;
    }

    let id = state.show_overlay(
      OverlayContent::ContextMenu {
        entries: entries.clone(),
      },
      pos,
    );
    state.menu = Some(OpenMenu {
      entries,
      target: pos,
    });
    schedule_remeasure(&self.shared, id);
  }

  fn request_goto_at(&self, kind: GotoKind, pos: Position) {
    if !self.connection.supports(kind.capability()) {
      return;
    }

    let shared = self.shared.clone();
    let connection = self.connection.clone();
    let options = self.options.clone();
    spawn_detached(async move {
      let result = match kind {
        GotoKind::Definition => connection.definition(pos).await,
        GotoKind::TypeDefinition => connection.type_definition(pos).await,
        GotoKind::References => connection.references(pos).await,
      };
      let value = match result {
        Ok(value) => value,
        Err(err) => {
          log::warn!("{} request failed: {err}", kind.label());
          return;
        },
      };
      let locations = match protocol::parse_locations(&value) {
        Ok(locations) => locations,
        Err(err) => {
          log::debug!("ignoring malformed {} response: {err}", kind.label());
          return;
        },
      };

      // Cross-document locations are not this adapter's concern.
      let uri = connection.document_uri();
      let ranges: Vec<Range> = locations
        .into_iter()
        .filter(|location| location.uri == uri)
        .map(|location| location.range)
        .collect();

      let mut state = shared.lock();
      if state.removed {
        return;
      }
      if ranges.is_empty() {
        // The highlight set is replaced wholesale; with no survivors the
        // view does not move and no highlight appears.
        state.clear_highlights();
        return;
      }
      let class = options.load_full().highlight_mark_class.clone();
      state.set_highlights(&ranges, &class);
      state.surface.scroll_to(ranges[0].start);
    });
  }
}

fn is_trigger(triggers: &[String], ch: char) -> bool {
  let mut buf = [0u8; 4];
  let encoded: &str = ch.encode_utf8(&mut buf);
  triggers.iter().any(|trigger| trigger == encoded)
}

fn is_over_token<S: EditorSurface>(state: &State<S>, pos: Position) -> bool {
  state
    .surface
    .line(pos.line)
    .and_then(|line| line.chars().nth(pos.ch as usize))
    .is_some_and(char_is_word)
}
