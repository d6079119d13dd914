//! Per-track request handlers.
//!
//! Each interaction class (hover, completion, signature help) runs its own
//! debounced [`AsyncHook`](tether_event::AsyncHook): the router forwards
//! editor activity as events, the hook fires the protocol request once the
//! stream goes quiet, and the eventual response re-validates against
//! current adapter state before touching the surface.

pub mod completion;
pub mod hover;
pub mod signature_help;

pub use completion::{
  CompletionEvent,
  CompletionHook,
};
pub use hover::{
  HoverEvent,
  HoverHook,
};
pub use signature_help::{
  SignatureEvent,
  SignatureHook,
};
