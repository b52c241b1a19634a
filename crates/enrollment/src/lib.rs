//! `registrar-enrollment` — the student enrollment state machine.
//!
//! ```text
//! NotEnrolled --enroll--> Enrolled(ungraded) --grade--> Enrolled(graded)
//!      ^                        |
//!      +---------drop-----------+
//! ```

pub mod engine;

pub use engine::{EnrolledCourse, EnrollmentEngine};
