//! Tether bridges a text editor's live interaction events to an LSP-style
//! backend and renders the asynchronous responses back onto the editor
//! surface: hover tooltips, completion lists, signature help, diagnostics
//! underlines and gutter marks, and navigation highlights.
//!
//! The editor widget and the transport client stay outside this crate: the
//! embedding application implements [`EditorSurface`] and [`Connection`]
//! and forwards subscribed events into [`Adapter::handle_event`].

pub mod adapter;
pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod handlers;
pub mod highlight;
pub mod menu;
pub mod overlay;
pub mod protocol;
pub mod surface;

pub use adapter::Adapter;
pub use config::{
  ContextMenuProvider,
  Options,
  Snippet,
};
pub use connection::{
  Connection,
  GotoKind,
  ServerCapability,
  TriggerKind,
};
pub use menu::MenuEntry;
pub use overlay::{
  OverlayContent,
  OverlayKind,
  place_overlay,
};
pub use surface::{
  EditorSurface,
  GutterId,
  MarkId,
  OverlayId,
  PixelPoint,
  PixelSize,
  Subscription,
  SurfaceEvent,
  SurfaceEventKind,
};
pub use tether_core::{
  Position,
  Range,
  TokenInfo,
};
