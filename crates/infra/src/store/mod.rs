//! Record store boundary.
//!
//! One read trait per aggregate with named queries, plus a single atomic
//! `commit` of a staged [`UnitOfWork`]. Services validate against reads made
//! before the commit; the store re-checks uniqueness and references at commit
//! time so concurrent writers cannot slip past the guard.

pub mod in_memory;
pub mod r#trait;
pub mod unit_of_work;

pub use in_memory::InMemoryRecordStore;
pub use r#trait::{
    AccountReader, AssignmentReader, CommitReceipt, CourseReader, DepartmentReader, EnrollmentReader,
    InstructorReader, RecordStore, StoreError, StoreResult, StudentReader,
};
pub use unit_of_work::{Change, RecordData, RecordKey, UnitOfWork};
