//! Record kinds, the stored-record trait and optimistic concurrency.

use serde::{Deserialize, Serialize};

/// The aggregate kinds the engine reasons about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Department,
    Course,
    Instructor,
    Student,
    Enrollment,
    Assignment,
    Account,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Department => "department",
            RecordKind::Course => "course",
            RecordKind::Instructor => "instructor",
            RecordKind::Student => "student",
            RecordKind::Enrollment => "enrollment",
            RecordKind::Assignment => "assignment",
            RecordKind::Account => "account",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record: identity plus a version used for concurrency checks.
///
/// Versions start at 1 when the store inserts a record and grow by one per
/// committed update. A record that was never stored reports version 0.
pub trait Record {
    /// Strongly-typed record identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    const KIND: RecordKind;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;

    /// Version of the record as last read from the store.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an update or delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// Skip version checking (administrative cascades, seeding).
    Any,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
