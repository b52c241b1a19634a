//! Email address shape shared by accounts and person records.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern"));

/// One `@`, a dotted domain, no whitespace. Surrounding padding is ignored.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL.is_match(s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ahmed.ali@mvclab.com"));
        assert!(is_valid_email(" A@B.io "));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("x@y@z.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("trailing@dot."));
        assert!(!is_valid_email("space in@example.com"));
    }
}
