//! The navigation highlight set.

use tether_core::Range;

use crate::surface::{
  EditorSurface,
  MarkId,
};

/// Ranges highlighted by the most recent navigation response. Replaced
/// wholesale on every new response, never merged.
#[derive(Debug, Default)]
pub struct HighlightSet {
  marks: Vec<MarkId>,
}

impl HighlightSet {
  pub fn is_empty(&self) -> bool {
    self.marks.is_empty()
  }

  pub fn replace<S: EditorSurface>(&mut self, surface: &mut S, ranges: &[Range], class: &str) {
    self.clear(surface);
    for range in ranges {
      self.marks.push(surface.mark_range(*range, class));
    }
  }

  pub fn clear<S: EditorSurface>(&mut self, surface: &mut S) {
    for mark in self.marks.drain(..) {
      surface.clear_mark(mark);
    }
  }
}
