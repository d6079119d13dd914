//! Utilities for declaring an async (usually debounced) hook

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  time::Instant,
};

/// Maximum time to block when sending to a full channel. Dropping an event
/// beats freezing the editor's input path.
const SEND_TIMEOUT_MS: u64 = 2;

/// Async hooks provide a framework for debounced event handlers. Each
/// interaction track (hover, completion, signature help) runs as a
/// background tokio task that waits for events sent through a channel and
/// only performs its expensive work once the event stream goes quiet.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;

  /// Called immediately whenever an event is received. The hook either
  /// consumes the event on the spot or debounces it by returning a new
  /// deadline (or extending the current one).
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called once the debounce deadline is reached with no newer event.
  /// Only the trailing call after the quiet period executes.
  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    // Events are drained immediately, so the channel stays nearly empty;
    // the headroom covers bursts of rapid typing.
    let (tx, rx) = mpsc::channel(128);
    // Only spawn the worker inside a runtime so unit tests that never touch
    // async paths don't need one.
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    }
    tx
  }
}

async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(deadline_) => {
        let res = tokio::time::timeout_at(deadline_, rx.recv()).await;
        match res {
          Ok(event) => event,
          Err(_) => {
            hook.finish_debounce();
            deadline = None;
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    let Some(event) = event else {
      break;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Send an event to a hook channel, blocking only briefly if it is full.
///
/// Designed for synchronous call sites (the editor's event handlers). It
/// prioritizes responsiveness: non-blocking send first, then a very short
/// bounded wait, then the event is dropped.
pub fn send_blocking<T>(tx: &Sender<T>, data: T) {
  match tx.try_send(data) {
    Ok(()) => {},
    Err(TrySendError::Full(data)) => {
      let _ = block_on(tx.send_timeout(data, Duration::from_millis(SEND_TIMEOUT_MS)));
    },
    Err(TrySendError::Closed(_)) => {
      // The hook task is gone (adapter removed); nothing left to notify.
      log::debug!("dropped event for closed hook channel");
    },
  }
}

/// Try to send an event without blocking at all.
/// Returns true if the event was sent, false if the channel was full or
/// closed.
pub fn try_send<T>(tx: &Sender<T>, data: T) -> bool {
  tx.try_send(data).is_ok()
}
