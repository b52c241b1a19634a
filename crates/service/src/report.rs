//! Caller-facing rendering of [`DomainError`].

use serde::Serialize;

use registrar_core::{ConflictKind, DomainError, FieldViolation};

const STALE_RECORD: &str = "This record was modified by another user. Please reload and try again";
const DUPLICATE_RECORD: &str = "A record with these values was just saved by another user. Please review and try again";
const PERSISTENCE_FAILURE: &str = "An error occurred while saving. Please try again";

/// Status, stable code and message for one failed operation, plus the field
/// findings a form can redisplay next to its inputs.
///
/// `Forbidden` renders the same for every target, so a report never reveals
/// whether a record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldViolation>,
}

impl ErrorReport {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.status, 409 | 500)
    }
}

impl From<&DomainError> for ErrorReport {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => Self {
                fields: violations.iter().cloned().collect(),
                ..Self::new(400, "validation_error", "One or more fields are invalid")
            },
            DomainError::NotFound { .. } => Self::new(404, "not_found", err.to_string()),
            DomainError::Forbidden => Self::new(403, "forbidden", "forbidden"),
            DomainError::Conflict { kind, message } => match kind {
                ConflictKind::StaleRecord => Self::new(409, "conflict", STALE_RECORD),
                ConflictKind::ConcurrentInsert => Self::new(409, "conflict", DUPLICATE_RECORD),
                ConflictKind::Duplicate | ConflictKind::Rule => Self::new(409, "conflict", message.clone()),
            },
            DomainError::Persistence(_) => Self::new(500, "persistence_error", PERSISTENCE_FAILURE),
        }
    }
}

impl From<DomainError> for ErrorReport {
    fn from(err: DomainError) -> Self {
        Self::from(&err)
    }
}
