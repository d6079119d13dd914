//! Character classes shared by token extraction and completion ranking.

#[derive(Debug, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Word,
  Punctuation,
  Unknown,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if c.is_whitespace() => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn word_chars() {
    assert!(char_is_word('a'));
    assert!(char_is_word('Z'));
    assert!(char_is_word('0'));
    assert!(char_is_word('_'));
    assert!(!char_is_word('.'));
    assert!(!char_is_word(' '));
  }

  #[test]
  fn punctuation_chars() {
    assert!(char_is_punctuation('.'));
    assert!(char_is_punctuation('('));
    assert!(char_is_punctuation(','));
    assert!(char_is_punctuation('$'));
    assert!(!char_is_punctuation('a'));
    assert!(!char_is_punctuation(' '));
  }

  #[test]
  fn categorize() {
    assert_eq!(categorize_char(' '), CharCategory::Whitespace);
    assert_eq!(categorize_char('x'), CharCategory::Word);
    assert_eq!(categorize_char(';'), CharCategory::Punctuation);
  }
}
