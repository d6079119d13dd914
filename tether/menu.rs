//! Capability-gated context-menu entries.

use crate::connection::{
  Connection,
  GotoKind,
};

/// One context-menu row: a label and the navigation it dispatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
  pub label: String,
  pub kind:  GotoKind,
}

impl MenuEntry {
  fn new(kind: GotoKind) -> Self {
    Self {
      label: kind.label().to_string(),
      kind,
    }
  }
}

/// Entries for the current server: one per supported navigation kind, in a
/// fixed order. An unsupported action is simply not offered, never
/// attempted and failed.
pub fn entries_for<C: Connection + ?Sized>(connection: &C) -> Vec<MenuEntry> {
  [
    GotoKind::Definition,
    GotoKind::TypeDefinition,
    GotoKind::References,
  ]
  .into_iter()
  .filter(|kind| connection.supports(kind.capability()))
  .map(MenuEntry::new)
  .collect()
}
