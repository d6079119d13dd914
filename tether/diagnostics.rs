//! Tracking and rendering of published diagnostics.
//!
//! Publications are "latest wins" snapshots per document: every publish
//! discards the previous marks and rebuilds from scratch, which stays
//! correct even when the network delivers publications out of order.

use tether_core::Range;

use crate::{
  config::Options,
  protocol::Diagnostic,
  surface::{
    EditorSurface,
    GutterId,
    MarkId,
  },
};

/// One logical marked range. Diagnostics sharing an identical `(start, end)`
/// pair merge into a single entry's message list instead of stacking
/// duplicate overlays.
#[derive(Debug)]
pub struct DiagnosticEntry {
  pub messages: Vec<String>,
  pub range:    Range,
  mark:         MarkId,
}

#[derive(Debug, Default)]
pub struct DiagnosticsTracker {
  entries: Vec<DiagnosticEntry>,
  gutter:  Vec<GutterId>,
}

impl DiagnosticsTracker {
  pub fn entries(&self) -> &[DiagnosticEntry] {
    &self.entries
  }

  /// Apply one publication: full replace, never an incremental patch.
  pub fn publish<S: EditorSurface>(
    &mut self,
    surface: &mut S,
    options: &Options,
    diagnostics: &[Diagnostic],
  ) {
    self.clear(surface);
    if !options.enable_diagnostics {
      return;
    }

    for diagnostic in diagnostics {
      let message = match &diagnostic.source {
        Some(source) => format!("{source}: {}", diagnostic.message),
        None => diagnostic.message.clone(),
      };

      if let Some(entry) = self
        .entries
        .iter_mut()
        .find(|entry| entry.range == diagnostic.range)
      {
        entry.messages.push(message);
        continue;
      }

      let mark = surface.mark_range(diagnostic.range, &options.diagnostic_mark_class);
      self.entries.push(DiagnosticEntry {
        messages: vec![message],
        range: diagnostic.range,
        mark,
      });
    }

    if options.enable_gutter_marks {
      self.rebuild_gutter(surface);
    }
  }

  /// One marker per affected line. When several entries share a line, the
  /// last-published entry's messages win as the marker tooltip.
  fn rebuild_gutter<S: EditorSurface>(&mut self, surface: &mut S) {
    let mut lines: Vec<u32> = Vec::new();
    let mut tooltips: Vec<String> = Vec::new();
    for entry in &self.entries {
      let line = entry.range.start.line;
      let tooltip = entry.messages.join("\n");
      match lines.iter().position(|seen| *seen == line) {
        Some(index) => tooltips[index] = tooltip,
        None => {
          lines.push(line);
          tooltips.push(tooltip);
        },
      }
    }

    for (line, tooltip) in lines.into_iter().zip(tooltips) {
      self.gutter.push(surface.set_gutter_mark(line, &tooltip));
    }
  }

  pub fn clear<S: EditorSurface>(&mut self, surface: &mut S) {
    for entry in self.entries.drain(..) {
      surface.clear_mark(entry.mark);
    }
    self.clear_gutter(surface);
  }

  pub fn clear_gutter<S: EditorSurface>(&mut self, surface: &mut S) {
    for mark in self.gutter.drain(..) {
      surface.clear_gutter_mark(mark);
    }
  }
}
