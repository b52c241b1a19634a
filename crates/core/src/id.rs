//! Strongly-typed record identifiers.
//!
//! Every identifier is an opaque integer. The value `0` is reserved for records
//! that have not been persisted yet; the record store assigns the real identity
//! on insert.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a department.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(u64);

/// Course number (the course's key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseNum(u64);

/// Identifier of an instructor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructorId(u64);

/// Identifier of a student (the student's SSN key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(u64);

/// Identifier of a student ↔ course enrollment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(u64);

/// Identifier of an instructor ↔ course teaching assignment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(u64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Placeholder identity for records that have not been stored yet.
            pub const UNASSIGNED: Self = Self(0);

            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            pub const fn is_assigned(self) -> bool {
                self.0 != 0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_field("id", format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(DepartmentId, "DepartmentId");
impl_int_newtype!(CourseNum, "CourseNum");
impl_int_newtype!(InstructorId, "InstructorId");
impl_int_newtype!(StudentId, "StudentId");
impl_int_newtype!(EnrollmentId, "EnrollmentId");
impl_int_newtype!(AssignmentId, "AssignmentId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_identifiers() {
        let id: StudentId = " 42 ".parse().unwrap();
        assert_eq!(id, StudentId::new(42));
        assert!(id.is_assigned());
    }

    #[test]
    fn rejects_non_numeric_identifiers() {
        let err = "abc".parse::<CourseNum>().unwrap_err();
        match err {
            DomainError::Validation(v) => {
                assert_eq!(v.len(), 1);
                assert!(v.for_field("id").next().is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn zero_is_unassigned() {
        assert!(!DepartmentId::UNASSIGNED.is_assigned());
        assert_eq!(DepartmentId::default(), DepartmentId::UNASSIGNED);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&EnrollmentId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
