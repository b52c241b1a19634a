//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordKind;
use crate::violation::{FieldViolation, Violations};

/// Result type used across the engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// Why a write was refused as a conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A state-machine rule, e.g. dropping a graded enrollment.
    Rule,
    /// The pair or unique value is already taken.
    Duplicate,
    /// The record changed since the caller loaded it.
    StaleRecord,
    /// A concurrent writer stored the same unique values first.
    ConcurrentInsert,
}

/// Engine-level error.
///
/// Validation, not-found and forbidden outcomes are deterministic: the caller
/// recovers by supplying different input or credentials. `Conflict` and
/// `Persistence` are retryable after a reload; the engine never retries on its
/// own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more field-tagged rule failures. Nothing was written.
    #[error("validation failed: {0}")]
    Validation(Violations),

    /// The target record does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    /// Access policy denial. Carries no detail about the target.
    #[error("forbidden")]
    Forbidden,

    /// The write clashes with current state. See [`ConflictKind`].
    #[error("conflict: {message}")]
    Conflict { kind: ConflictKind, message: String },

    /// Unexpected store failure. The mutation did not apply.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(violations: Violations) -> Self {
        Self::Validation(violations)
    }

    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(FieldViolation::new(field, reason).into())
    }

    pub fn not_found(kind: RecordKind, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::Rule,
            message: msg.into(),
        }
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::Duplicate,
            message: msg.into(),
        }
    }

    pub fn concurrent_insert(msg: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::ConcurrentInsert,
            message: msg.into(),
        }
    }

    pub fn stale(msg: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::StaleRecord,
            message: msg.into(),
        }
    }

    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            DomainError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Whether reloading and resubmitting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. } | DomainError::Persistence(_))
    }

    /// Field violations carried by a validation failure, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            DomainError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_discloses_nothing() {
        assert_eq!(DomainError::Forbidden.to_string(), "forbidden");
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = DomainError::not_found(RecordKind::Course, 10u64);
        assert_eq!(err.to_string(), "course 10 not found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn conflict_constructors_tag_their_kind() {
        assert_eq!(DomainError::conflict("graded").conflict_kind(), Some(ConflictKind::Rule));
        assert_eq!(DomainError::duplicate("pair taken").conflict_kind(), Some(ConflictKind::Duplicate));
        assert_eq!(DomainError::stale("v2 != v3").to_string(), "conflict: v2 != v3");
        assert_eq!(DomainError::Forbidden.conflict_kind(), None);
    }

    #[test]
    fn conflicts_and_persistence_failures_are_retryable() {
        assert!(DomainError::stale("stale").is_retryable());
        assert!(DomainError::persistence("down").is_retryable());
        assert!(!DomainError::Forbidden.is_retryable());
    }
}
