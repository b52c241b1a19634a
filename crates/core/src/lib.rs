//! `registrar-core` — shared vocabulary for the academic records engine.
//!
//! This crate contains **pure domain** primitives (no storage, no transport):
//! typed identifiers, record kinds, optimistic concurrency expectations and the
//! error taxonomy every other crate reports through.

pub mod email;
pub mod error;
pub mod id;
pub mod record;
pub mod violation;

pub use email::is_valid_email;
pub use error::{ConflictKind, DomainError, DomainResult};
pub use id::{AssignmentId, CourseNum, DepartmentId, EnrollmentId, InstructorId, StudentId};
pub use record::{ExpectedVersion, Record, RecordKind};
pub use violation::{FieldViolation, NON_FIELD, Violations};
