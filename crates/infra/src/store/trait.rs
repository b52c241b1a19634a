use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use registrar_auth::{AccountId, UserAccount};
use registrar_core::{
    AssignmentId, CourseNum, DepartmentId, DomainError, EnrollmentId, InstructorId, RecordKind, StudentId,
};
use registrar_records::{Assignment, Course, Department, DepartmentDependents, Enrollment, Instructor, Student};

use super::unit_of_work::UnitOfWork;

/// Record store operation error.
///
/// These are **infrastructure errors** (concurrency, constraints, availability)
/// as opposed to domain errors (validation, authorization).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency check failed (version mismatch).
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A uniqueness or reference constraint would be broken by the commit.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Update or delete target is missing.
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },

    /// The store could not be reached or failed unexpectedly.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => DomainError::stale(format!(
                "the record was modified by another user ({msg}); reload and try again"
            )),
            StoreError::Constraint(msg) => DomainError::concurrent_insert(format!(
                "another record with the same values was saved first ({msg})"
            )),
            StoreError::NotFound { kind, id } => DomainError::not_found(kind, id.parse::<u64>().unwrap_or_default()),
            StoreError::Unavailable(msg) => DomainError::persistence(msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Identities assigned to the records inserted by one commit, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    inserted: Vec<(RecordKind, u64)>,
}

impl CommitReceipt {
    pub fn record_insert(&mut self, kind: RecordKind, id: u64) {
        self.inserted.push((kind, id));
    }

    pub fn inserted(&self) -> &[(RecordKind, u64)] {
        &self.inserted
    }

    /// First identity assigned to a record of `kind`.
    pub fn first(&self, kind: RecordKind) -> Option<u64> {
        self.inserted.iter().find(|(k, _)| *k == kind).map(|(_, id)| *id)
    }

    pub fn department_id(&self) -> Option<DepartmentId> {
        self.first(RecordKind::Department).map(DepartmentId::new)
    }

    pub fn course_num(&self) -> Option<CourseNum> {
        self.first(RecordKind::Course).map(CourseNum::new)
    }

    pub fn instructor_id(&self) -> Option<InstructorId> {
        self.first(RecordKind::Instructor).map(InstructorId::new)
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.first(RecordKind::Student).map(StudentId::new)
    }

    pub fn enrollment_id(&self) -> Option<EnrollmentId> {
        self.first(RecordKind::Enrollment).map(EnrollmentId::new)
    }

    pub fn assignment_id(&self) -> Option<AssignmentId> {
        self.first(RecordKind::Assignment).map(AssignmentId::new)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-aggregate reads
// ─────────────────────────────────────────────────────────────────────────────

pub trait DepartmentReader: Send + Sync {
    fn department(&self, id: DepartmentId) -> StoreResult<Option<Department>>;
    fn departments(&self) -> StoreResult<Vec<Department>>;
    /// Departments whose name matches case-insensitively.
    fn department_by_name(&self, name: &str) -> StoreResult<Vec<Department>>;
    fn department_dependents(&self, id: DepartmentId) -> StoreResult<DepartmentDependents>;
}

pub trait CourseReader: Send + Sync {
    fn course(&self, num: CourseNum) -> StoreResult<Option<Course>>;
    fn courses(&self) -> StoreResult<Vec<Course>>;
    fn courses_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Course>>;
    /// Whether any enrollment or assignment references the course.
    fn course_has_relations(&self, num: CourseNum) -> StoreResult<bool>;
}

pub trait InstructorReader: Send + Sync {
    fn instructor(&self, id: InstructorId) -> StoreResult<Option<Instructor>>;
    fn instructors(&self) -> StoreResult<Vec<Instructor>>;
    /// Instructors whose email matches case-insensitively.
    fn instructors_by_email(&self, email: &str) -> StoreResult<Vec<Instructor>>;
    fn instructors_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Instructor>>;
}

pub trait StudentReader: Send + Sync {
    fn student(&self, id: StudentId) -> StoreResult<Option<Student>>;
    fn students(&self) -> StoreResult<Vec<Student>>;
    /// Students whose email matches case-insensitively.
    fn students_by_email(&self, email: &str) -> StoreResult<Vec<Student>>;
    fn students_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Student>>;
}

pub trait EnrollmentReader: Send + Sync {
    fn enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>>;
    fn enrollments(&self) -> StoreResult<Vec<Enrollment>>;
    fn enrollment_for(&self, student_id: StudentId, course_num: CourseNum) -> StoreResult<Option<Enrollment>>;
    fn enrollments_for_student(&self, student_id: StudentId) -> StoreResult<Vec<Enrollment>>;
    fn enrollments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Enrollment>>;
}

pub trait AssignmentReader: Send + Sync {
    fn assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;
    fn assignments(&self) -> StoreResult<Vec<Assignment>>;
    fn assignment_for(&self, instructor_id: InstructorId, course_num: CourseNum) -> StoreResult<Option<Assignment>>;
    fn assignments_for_instructor(&self, instructor_id: InstructorId) -> StoreResult<Vec<Assignment>>;
    fn assignments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Assignment>>;
}

pub trait AccountReader: Send + Sync {
    fn account(&self, id: AccountId) -> StoreResult<Option<UserAccount>>;
    /// Account registered under an email, matched case-insensitively.
    fn account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;
}

/// Full record store: every named read plus an atomic unit-of-work commit.
///
/// ## Commit semantics
///
/// `commit()`:
/// - applies every staged change or none of them
/// - assigns identities to inserted records whose id is unassigned (0)
/// - sets `version = 1` on insert and bumps it by one on update
/// - rejects an update/delete whose `ExpectedVersion` does not match
/// - re-checks uniqueness and reference constraints against the result, so a
///   check-then-act race surfaces as `StoreError::Constraint`
pub trait RecordStore:
    DepartmentReader + CourseReader + InstructorReader + StudentReader + EnrollmentReader + AssignmentReader + AccountReader
{
    fn commit(&self, unit: UnitOfWork) -> StoreResult<CommitReceipt>;

    /// Reserve an identity for a record inserted later with that id already set.
    fn reserve_id(&self, kind: RecordKind) -> StoreResult<u64>;
}

macro_rules! forward_to_inner {
    ($trait:ident { $(fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)* }) => {
        impl<S> $trait for Arc<S>
        where
            S: $trait + ?Sized,
        {
            $(
                fn $name(&self $(, $arg: $ty)*) -> $ret {
                    (**self).$name($($arg),*)
                }
            )*
        }
    };
}

forward_to_inner!(DepartmentReader {
    fn department(&self, id: DepartmentId) -> StoreResult<Option<Department>>;
    fn departments(&self) -> StoreResult<Vec<Department>>;
    fn department_by_name(&self, name: &str) -> StoreResult<Vec<Department>>;
    fn department_dependents(&self, id: DepartmentId) -> StoreResult<DepartmentDependents>;
});

forward_to_inner!(CourseReader {
    fn course(&self, num: CourseNum) -> StoreResult<Option<Course>>;
    fn courses(&self) -> StoreResult<Vec<Course>>;
    fn courses_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Course>>;
    fn course_has_relations(&self, num: CourseNum) -> StoreResult<bool>;
});

forward_to_inner!(InstructorReader {
    fn instructor(&self, id: InstructorId) -> StoreResult<Option<Instructor>>;
    fn instructors(&self) -> StoreResult<Vec<Instructor>>;
    fn instructors_by_email(&self, email: &str) -> StoreResult<Vec<Instructor>>;
    fn instructors_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Instructor>>;
});

forward_to_inner!(StudentReader {
    fn student(&self, id: StudentId) -> StoreResult<Option<Student>>;
    fn students(&self) -> StoreResult<Vec<Student>>;
    fn students_by_email(&self, email: &str) -> StoreResult<Vec<Student>>;
    fn students_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Student>>;
});

forward_to_inner!(EnrollmentReader {
    fn enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>>;
    fn enrollments(&self) -> StoreResult<Vec<Enrollment>>;
    fn enrollment_for(&self, student_id: StudentId, course_num: CourseNum) -> StoreResult<Option<Enrollment>>;
    fn enrollments_for_student(&self, student_id: StudentId) -> StoreResult<Vec<Enrollment>>;
    fn enrollments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Enrollment>>;
});

forward_to_inner!(AssignmentReader {
    fn assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;
    fn assignments(&self) -> StoreResult<Vec<Assignment>>;
    fn assignment_for(&self, instructor_id: InstructorId, course_num: CourseNum) -> StoreResult<Option<Assignment>>;
    fn assignments_for_instructor(&self, instructor_id: InstructorId) -> StoreResult<Vec<Assignment>>;
    fn assignments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Assignment>>;
});

forward_to_inner!(AccountReader {
    fn account(&self, id: AccountId) -> StoreResult<Option<UserAccount>>;
    fn account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;
});

forward_to_inner!(RecordStore {
    fn commit(&self, unit: UnitOfWork) -> StoreResult<CommitReceipt>;
    fn reserve_id(&self, kind: RecordKind) -> StoreResult<u64>;
});
