//! Staged changes committed atomically by a [`RecordStore`](super::RecordStore).

use serde::{Deserialize, Serialize};

use registrar_auth::{AccountId, UserAccount};
use registrar_core::{
    AssignmentId, CourseNum, DepartmentId, EnrollmentId, ExpectedVersion, InstructorId, RecordKind, StudentId,
};
use registrar_records::{Assignment, Course, Department, Enrollment, Instructor, Student};

/// A full record staged for insert or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum RecordData {
    Department(Department),
    Course(Course),
    Instructor(Instructor),
    Student(Student),
    Enrollment(Enrollment),
    Assignment(Assignment),
    Account(UserAccount),
}

impl RecordData {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::Department(_) => RecordKind::Department,
            RecordData::Course(_) => RecordKind::Course,
            RecordData::Instructor(_) => RecordKind::Instructor,
            RecordData::Student(_) => RecordKind::Student,
            RecordData::Enrollment(_) => RecordKind::Enrollment,
            RecordData::Assignment(_) => RecordKind::Assignment,
            RecordData::Account(_) => RecordKind::Account,
        }
    }
}

/// Identity of a record staged for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordKey {
    Department(DepartmentId),
    Course(CourseNum),
    Instructor(InstructorId),
    Student(StudentId),
    Enrollment(EnrollmentId),
    Assignment(AssignmentId),
    Account(AccountId),
}

impl RecordKey {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordKey::Department(_) => RecordKind::Department,
            RecordKey::Course(_) => RecordKind::Course,
            RecordKey::Instructor(_) => RecordKind::Instructor,
            RecordKey::Student(_) => RecordKind::Student,
            RecordKey::Enrollment(_) => RecordKind::Enrollment,
            RecordKey::Assignment(_) => RecordKind::Assignment,
            RecordKey::Account(_) => RecordKind::Account,
        }
    }
}

macro_rules! record_conversions {
    ($($variant:ident: $record:ty => $id:ty),* $(,)?) => {
        $(
            impl From<$record> for RecordData {
                fn from(value: $record) -> Self {
                    RecordData::$variant(value)
                }
            }

            impl From<$id> for RecordKey {
                fn from(value: $id) -> Self {
                    RecordKey::$variant(value)
                }
            }
        )*
    };
}

record_conversions!(
    Department: Department => DepartmentId,
    Course: Course => CourseNum,
    Instructor: Instructor => InstructorId,
    Student: Student => StudentId,
    Enrollment: Enrollment => EnrollmentId,
    Assignment: Assignment => AssignmentId,
    Account: UserAccount => AccountId,
);

/// One staged mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    Insert(RecordData),
    Update(RecordData, ExpectedVersion),
    Delete(RecordKey, ExpectedVersion),
}

/// Ordered set of changes applied all-or-nothing by one commit.
///
/// Each logical operation builds exactly one unit of work after all of its
/// validation has passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfWork {
    changes: Vec<Change>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: impl Into<RecordData>) -> &mut Self {
        self.changes.push(Change::Insert(record.into()));
        self
    }

    pub fn update(&mut self, record: impl Into<RecordData>, expected: ExpectedVersion) -> &mut Self {
        self.changes.push(Change::Update(record.into(), expected));
        self
    }

    pub fn delete(&mut self, key: impl Into<RecordKey>, expected: ExpectedVersion) -> &mut Self {
        self.changes.push(Change::Delete(key.into(), expected));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_changes_in_order() {
        let mut unit = UnitOfWork::new();
        unit.delete(EnrollmentId::new(1), ExpectedVersion::Any)
            .delete(StudentId::new(7), ExpectedVersion::Exact(3));
        assert_eq!(unit.len(), 2);
        match &unit.changes()[1] {
            Change::Delete(key, ExpectedVersion::Exact(3)) => assert_eq!(key.kind(), RecordKind::Student),
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn record_data_knows_its_kind() {
        let data: RecordData = Enrollment::new(StudentId::new(42), CourseNum::new(10)).into();
        assert_eq!(data.kind(), RecordKind::Enrollment);
    }
}
