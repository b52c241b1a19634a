//! Field-tagged validation findings.
//!
//! Validators never stop at the first problem: they collect every violation so
//! a caller can redisplay each one beside its input.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Field name used for findings that do not belong to a single input.
pub const NON_FIELD: &str = "";

/// One rejected field and the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_non_field(&self) -> bool {
        self.field.is_empty()
    }
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_non_field() {
            f.write_str(&self.reason)
        } else {
            write!(f, "{}: {}", self.field, self.reason)
        }
    }
}

/// Ordered collection of violations. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldViolation::new(field, reason));
    }

    /// Record a violation when `failed` holds.
    pub fn check(&mut self, failed: bool, field: &str, reason: impl Into<String>) {
        if failed {
            self.push(field, reason);
        }
    }

    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldViolation> + 'a {
        self.0.iter().filter(move |v| v.field == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// `Ok(())` when empty, otherwise a `DomainError::Validation`.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl From<FieldViolation> for Violations {
    fn from(value: FieldViolation) -> Self {
        Self(vec![value])
    }
}

impl IntoIterator for Violations {
    type Item = FieldViolation;
    type IntoIter = std::vec::IntoIter<FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl core::fmt::Display for Violations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, v) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            core::fmt::Display::fmt(v, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_is_ok() {
        assert!(Violations::new().into_result().is_ok());
    }

    #[test]
    fn collects_every_failure_in_order() {
        let mut v = Violations::new();
        v.check(true, "name", "too short");
        v.check(false, "email", "never recorded");
        v.push("age", "out of range");

        assert_eq!(v.len(), 2);
        assert!(v.has_field("name"));
        assert!(!v.has_field("email"));
        assert_eq!(v.to_string(), "name: too short; age: out of range");
    }

    #[test]
    fn non_field_violation_renders_reason_only() {
        let v = FieldViolation::new(NON_FIELD, "try again later");
        assert!(v.is_non_field());
        assert_eq!(v.to_string(), "try again later");
    }
}
