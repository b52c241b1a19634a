//! `registrar-records` — the academic record graph and its integrity rules.
//!
//! Entities carry their own field-shape rules (`check_shape`). Rules that need
//! persisted state (uniqueness, relations, department categories) live in
//! [`IntegrityGuard`], which inspects snapshots the caller read beforehand and
//! never touches storage itself.

pub mod assignment;
pub mod course;
pub mod department;
pub mod enrollment;
pub mod guard;
pub mod instructor;
pub mod rules;
pub mod salary;
pub mod student;

pub use assignment::Assignment;
pub use course::Course;
pub use department::{Department, DepartmentDependents};
pub use enrollment::{Enrollment, EnrollmentState, GradeBand, UNGRADED};
pub use guard::{
    AssignmentSnapshot, CourseSnapshot, EnrollmentSnapshot, InstructorSnapshot, IntegrityGuard,
    StudentSnapshot,
};
pub use instructor::Instructor;
pub use salary::{SalaryPolicy, SalaryRule};
pub use student::{Gender, Student};
