//! Shared field-shape predicates.

use std::sync::LazyLock;

use regex::Regex;

pub use registrar_core::is_valid_email;

static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name pattern"));

/// Number of characters after trimming surrounding whitespace.
pub fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

pub fn len_between(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&char_len(s))
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn is_letters_and_spaces(s: &str) -> bool {
    LETTERS_AND_SPACES.is_match(s)
}

/// Case-insensitive comparison used by every uniqueness rule.
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
