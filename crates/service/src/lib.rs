//! `registrar-service` — application use cases for the records engine.
//!
//! Every operation takes the calling [`registrar_auth::Principal`] and runs
//! authorize → validate → commit over a [`registrar_infra::RecordStore`].

pub mod accounts;
pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod instructors;
pub(crate) mod registrar;
pub mod report;
pub mod students;

pub use courses::CourseDetails;
pub use departments::DepartmentDetails;
pub use instructors::InstructorDetails;
pub use registrar::Registrar;
pub use report::ErrorReport;
pub use students::StudentDetails;
