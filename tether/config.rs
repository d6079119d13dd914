//! Adapter configuration.
//!
//! Options are an immutable-per-update snapshot: the embedding editor hands
//! over a complete struct (serde fills the unset fields with defaults) and
//! the adapter swaps the whole snapshot atomically. Nothing mutates a live
//! snapshot in place.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
  menu::MenuEntry,
  surface::PixelPoint,
};

/// Hook that replaces the built-in context menu. Receives the click point
/// and the capability-gated entries; invoking an entry goes back through
/// [`Adapter::select_menu_entry`](crate::Adapter::select_menu_entry).
pub type ContextMenuProvider = Arc<dyn Fn(PixelPoint, &[MenuEntry]) + Send + Sync>;

/// A static completion snippet, offered alongside server completions. An
/// exact label match keeps snippets visible where server items would be
/// suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Snippet {
  pub label: String,
  pub body:  String,
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
  pub enable_hover_info:                bool,
  pub enable_diagnostics:               bool,
  pub enable_signatures:                bool,
  pub enable_gutter_marks:              bool,
  pub enable_context_menu:              bool,
  /// Enable the completion list UI.
  pub suggest:                          bool,
  pub debounce_suggestions_while_typing: bool,
  /// Quiet period for typing-driven completion and signature requests.
  pub quick_suggestions_delay_ms:       u64,
  /// Quiet period for pointer-driven hover requests.
  pub hover_delay_ms:                   u64,
  pub diagnostic_mark_class:            String,
  pub hover_mark_class:                 String,
  pub highlight_mark_class:             String,
  pub snippets:                         Vec<Snippet>,
  #[serde(skip)]
  pub context_menu_provider:            Option<ContextMenuProvider>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      enable_hover_info:                true,
      enable_diagnostics:               true,
      enable_signatures:                true,
      enable_gutter_marks:              true,
      enable_context_menu:              true,
      suggest:                          true,
      debounce_suggestions_while_typing: true,
      quick_suggestions_delay_ms:       200,
      hover_delay_ms:                   300,
      diagnostic_mark_class:            "tether-mark-error".to_string(),
      hover_mark_class:                 "tether-hover".to_string(),
      highlight_mark_class:             "tether-highlight".to_string(),
      snippets:                         Vec::new(),
      context_menu_provider:            None,
    }
  }
}

impl std::fmt::Debug for Options {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Options")
      .field("enable_hover_info", &self.enable_hover_info)
      .field("enable_diagnostics", &self.enable_diagnostics)
      .field("enable_signatures", &self.enable_signatures)
      .field("enable_gutter_marks", &self.enable_gutter_marks)
      .field("enable_context_menu", &self.enable_context_menu)
      .field("suggest", &self.suggest)
      .field(
        "debounce_suggestions_while_typing",
        &self.debounce_suggestions_while_typing,
      )
      .field("quick_suggestions_delay_ms", &self.quick_suggestions_delay_ms)
      .field("hover_delay_ms", &self.hover_delay_ms)
      .field("diagnostic_mark_class", &self.diagnostic_mark_class)
      .field("hover_mark_class", &self.hover_mark_class)
      .field("highlight_mark_class", &self.highlight_mark_class)
      .field("snippets", &self.snippets)
      .field(
        "context_menu_provider",
        &self.context_menu_provider.as_ref().map(|_| "<fn>"),
      )
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_fill_unset_fields() {
    let options: Options = serde_json::from_value(serde_json::json!({
      "suggest": false,
      "quick_suggestions_delay_ms": 50,
    }))
    .expect("valid options");

    assert!(!options.suggest);
    assert_eq!(options.quick_suggestions_delay_ms, 50);
    // Everything unset comes from Default.
    assert!(options.enable_hover_info);
    assert_eq!(options.hover_delay_ms, 300);
    assert_eq!(options.diagnostic_mark_class, "tether-mark-error");
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let result: Result<Options, _> = serde_json::from_value(serde_json::json!({
      "enable_hover": true,
    }));
    assert!(result.is_err());
  }
}
