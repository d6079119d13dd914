//! The abstract protocol connection.
//!
//! The transport client (JSON-RPC framing, lifecycle, capability
//! negotiation) lives outside this crate. The adapter sees async request
//! methods that resolve to raw JSON results, decoded at the boundary by
//! [`crate::protocol`], plus capability and trigger-set queries answered
//! from the negotiated server capabilities. There is no request
//! cancellation: a newer request never invalidates an older in-flight one;
//! staleness is handled when the response arrives.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tether_core::Position;

use crate::surface::Subscription;

/// Server capabilities the adapter gates UI on. Navigation entries are only
/// offered when the corresponding query returns true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerCapability {
  Definition,
  TypeDefinition,
  References,
}

/// Navigation request kinds reachable from the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoKind {
  Definition,
  TypeDefinition,
  References,
}

impl GotoKind {
  pub fn capability(self) -> ServerCapability {
    match self {
      GotoKind::Definition => ServerCapability::Definition,
      GotoKind::TypeDefinition => ServerCapability::TypeDefinition,
      GotoKind::References => ServerCapability::References,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      GotoKind::Definition => "Go to definition",
      GotoKind::TypeDefinition => "Go to type definition",
      GotoKind::References => "Find references",
    }
  }
}

/// How a completion request was initiated, mirrored onto the wire context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
  /// Typing a word character.
  Invoked,
  /// Typing one of the server's registered completion trigger characters.
  TriggerCharacter,
}

#[async_trait]
pub trait Connection: Send + Sync + 'static {
  /// URI of the document this connection is synchronized to. Navigation
  /// results for other URIs are dropped by the adapter.
  fn document_uri(&self) -> String;

  fn supports(&self, capability: ServerCapability) -> bool;

  /// Completion trigger characters registered by the server.
  fn completion_triggers(&self) -> Vec<String>;

  /// Signature-help trigger characters registered by the server.
  fn signature_triggers(&self) -> Vec<String>;

  /// Push the latest buffer contents to the server. Sent on every buffer
  /// change, before any request derived from that change.
  fn notify_change(&self);

  /// Register for `publishDiagnostics` pushes. The host forwards each
  /// publication to [`Adapter::publish_diagnostics`] until the token is
  /// disposed.
  ///
  /// [`Adapter::publish_diagnostics`]: crate::Adapter::publish_diagnostics
  fn subscribe_diagnostics(&self) -> Subscription;

  async fn hover(&self, pos: Position) -> Result<Value>;

  async fn completion(
    &self,
    pos: Position,
    token: String,
    trigger_char: Option<String>,
    trigger_kind: TriggerKind,
  ) -> Result<Value>;

  async fn signature_help(&self, pos: Position) -> Result<Value>;

  async fn definition(&self, pos: Position) -> Result<Value>;

  async fn type_definition(&self, pos: Position) -> Result<Value>;

  async fn references(&self, pos: Position) -> Result<Value>;
}
