//! Buffer coordinates and their protocol mapping.
//!
//! The editor addresses text as zero-based `{line, ch}` pairs; the protocol
//! speaks `{line, character}`. Both are the same numbers, so the mapping is
//! a serde rename plus explicit conversion helpers. Positions are always
//! re-derived from the surface on each event, never cached across buffer
//! mutations.

use serde::{
  Deserialize,
  Serialize,
};

/// A single point in the buffer. Zero-based line and character offset.
#[derive(
  Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
  pub line: u32,
  #[serde(rename = "character")]
  pub ch:   u32,
}

impl Position {
  pub fn new(line: u32, ch: u32) -> Self {
    Self { line, ch }
  }
}

/// A half-open span between two buffer positions, `start <= end`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
  pub start: Position,
  pub end:   Position,
}

impl Range {
  pub fn new(start: Position, end: Position) -> Self {
    Self { start, end }
  }

  pub fn point(pos: Position) -> Self {
    Self {
      start: pos,
      end:   pos,
    }
  }

  /// Whether `pos` falls inside the range, start inclusive, end inclusive.
  ///
  /// Hover re-validation treats a cursor sitting exactly on the range end as
  /// still inside, matching how servers report hover ranges.
  pub fn contains(&self, pos: Position) -> bool {
    self.start <= pos && pos <= self.end
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ordering_is_line_major() {
    assert!(Position::new(0, 9) < Position::new(1, 0));
    assert!(Position::new(2, 3) < Position::new(2, 4));
    assert!(Position::new(2, 3) == Position::new(2, 3));
  }

  #[test]
  fn containment() {
    let range = Range::new(Position::new(1, 2), Position::new(1, 6));
    assert!(range.contains(Position::new(1, 2)));
    assert!(range.contains(Position::new(1, 4)));
    assert!(range.contains(Position::new(1, 6)));
    assert!(!range.contains(Position::new(1, 7)));
    assert!(!range.contains(Position::new(0, 4)));
  }

  #[test]
  fn protocol_field_name_roundtrip() {
    let pos: Position = serde_json::from_value(serde_json::json!({
      "line": 3,
      "character": 7,
    }))
    .expect("valid position");
    assert_eq!(pos, Position::new(3, 7));

    let value = serde_json::to_value(pos).expect("serializable");
    assert_eq!(value["character"], 7);
  }
}
