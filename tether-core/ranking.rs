//! Prefix filtering and ordering of completion candidates.
//!
//! The ranker is shape-agnostic: server completions and static snippets go
//! through the same pass, distinguished only by whether an exact label
//! match may survive. Ordering is a stable partition, not a full sort:
//! label-prefix matches first, everything else (kept via filter text) after,
//! original order preserved within each half.

use crate::chars::char_is_word;

pub trait Candidate {
  fn label(&self) -> &str;

  /// Server-provided filter text, when it differs from the label.
  fn filter_text(&self) -> Option<&str> {
    None
  }

  /// Whether a candidate whose label equals the typed word should still be
  /// offered. True for static snippets, false for server completions, so a
  /// completion identical to what is already typed is suppressed while
  /// snippets stay visible.
  fn allows_exact_match(&self) -> bool {
    false
  }
}

/// Filter and order `candidates` against the typed `prefix`.
pub fn rank<T: Candidate>(prefix: &str, candidates: Vec<T>) -> Vec<T> {
  let word = first_word(prefix);
  if word.chars().any(|c| !char_is_word(c)) || candidates.is_empty() {
    return Vec::new();
  }
  let word = word.to_lowercase();

  let kept: Vec<T> = candidates
    .into_iter()
    .filter(|candidate| keeps(candidate, &word))
    .collect();

  let (mut matching, rest): (Vec<T>, Vec<T>) = kept
    .into_iter()
    .partition(|candidate| label_matches(candidate.label(), &word));
  matching.extend(rest);
  matching
}

fn keeps<T: Candidate>(candidate: &T, word: &str) -> bool {
  if !candidate.allows_exact_match() && candidate.label().to_lowercase() == word {
    return false;
  }
  let filter_matches = candidate
    .filter_text()
    .is_some_and(|filter| filter.to_lowercase().starts_with(word));
  filter_matches || label_matches(candidate.label(), word)
}

fn label_matches(label: &str, word: &str) -> bool {
  label.to_lowercase().starts_with(word)
}

/// First word of the prefix, splitting on runs of non-word characters.
fn first_word(prefix: &str) -> &str {
  prefix.split(|c: char| !char_is_word(c)).next().unwrap_or("")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, PartialEq)]
  struct Item {
    label:    &'static str,
    filter:   Option<&'static str>,
    exact_ok: bool,
  }

  impl Candidate for Item {
    fn label(&self) -> &str {
      self.label
    }

    fn filter_text(&self) -> Option<&str> {
      self.filter
    }

    fn allows_exact_match(&self) -> bool {
      self.exact_ok
    }
  }

  fn server(label: &'static str) -> Item {
    Item {
      label,
      filter: None,
      exact_ok: false,
    }
  }

  fn snippet(label: &'static str) -> Item {
    Item {
      label,
      filter: None,
      exact_ok: true,
    }
  }

  #[test]
  fn prefix_matches_kept_and_front() {
    let ranked = rank("le", vec![server("length"), server("left"), server("map")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["length", "left"]);
  }

  #[test]
  fn exact_server_label_excluded() {
    let ranked = rank("le", vec![server("le"), server("length")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["length"]);
  }

  #[test]
  fn exact_snippet_label_survives() {
    let ranked = rank("le", vec![snippet("le"), server("le")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["le"]);
  }

  #[test]
  fn filter_text_matches_sort_after_label_matches() {
    let by_filter = Item {
      label:    "zz_internal",
      filter:   Some("lens"),
      exact_ok: false,
    };
    let ranked = rank("le", vec![by_filter, server("left")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["left", "zz_internal"]);
  }

  #[test]
  fn match_is_case_insensitive() {
    let ranked = rank("Le", vec![server("Length"), server("map")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["Length"]);
  }

  #[test]
  fn underscores_are_part_of_the_word() {
    let ranked = rank("foo_", vec![server("foo_bar"), server("map")]);
    let labels: Vec<_> = ranked.iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["foo_bar"]);
  }

  #[test]
  fn trigger_character_prefix_keeps_everything() {
    // A bare "." prefix has an empty first word: nothing is filtered out.
    let ranked = rank(".", vec![server("len"), server("map")]);
    assert_eq!(ranked.len(), 2);
  }

  #[test]
  fn no_candidates_yields_empty() {
    let ranked: Vec<Item> = rank("le", Vec::new());
    assert!(ranked.is_empty());
  }
}
