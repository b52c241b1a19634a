use serde::Serialize;
use tracing::instrument;

use registrar_auth::{Operation, Principal};
use registrar_core::{DomainResult, ExpectedVersion, InstructorId, RecordKind};
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::{Assignment, Course, Department, Instructor, InstructorSnapshot};

use crate::Registrar;
use crate::registrar::bumped;

/// An instructor profile with the courses they teach.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorDetails {
    pub instructor: Instructor,
    pub department: Option<Department>,
    pub assignments: Vec<Assignment>,
    pub courses: Vec<Course>,
}

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_instructors(&self, principal: &Principal) -> DomainResult<Vec<Instructor>> {
        self.authorize(principal, Operation::List, RecordKind::Instructor, None)?;
        Ok(self.store().instructors()?)
    }

    pub fn instructor_details(&self, principal: &Principal, id: InstructorId) -> DomainResult<InstructorDetails> {
        self.authorize(principal, Operation::View, RecordKind::Instructor, Some(id.get()))?;
        let instructor = self
            .store()
            .instructor(id)?
            .ok_or_else(|| self.not_found(RecordKind::Instructor, id))?;

        let assignments = self.store().assignments_for_instructor(id)?;
        let mut courses = Vec::with_capacity(assignments.len());
        for assignment in &assignments {
            if let Some(course) = self.store().course(assignment.course_num)? {
                courses.push(course);
            }
        }
        Ok(InstructorDetails {
            department: self.store().department(instructor.department_id)?,
            instructor,
            assignments,
            courses,
        })
    }

    #[instrument(skip(self, principal, instructor), fields(email = %instructor.email), err)]
    pub fn create_instructor(&self, principal: &Principal, instructor: Instructor) -> DomainResult<Instructor> {
        self.authorize(principal, Operation::Create, RecordKind::Instructor, None)?;

        let mut instructor = instructor;
        instructor.id = InstructorId::UNASSIGNED;
        self.check_instructor(&instructor)?;

        let mut unit = UnitOfWork::new();
        unit.insert(instructor.clone());
        let receipt = self.commit(unit)?;

        instructor.id = receipt.instructor_id().unwrap_or_default();
        instructor.version = 1;
        tracing::info!(instructor_id = %instructor.id, "instructor created");
        Ok(instructor)
    }

    /// Update an instructor record.
    ///
    /// An instructor editing their own profile cannot touch salary, rating or
    /// department; those keep their stored values.
    #[instrument(skip(self, principal, instructor), fields(role = %principal.role()), err)]
    pub fn update_instructor(
        &self,
        principal: &Principal,
        id: InstructorId,
        instructor: Instructor,
        expected: ExpectedVersion,
    ) -> DomainResult<Instructor> {
        self.authorize(principal, Operation::Edit, RecordKind::Instructor, Some(id.get()))?;
        if instructor.id != id {
            return Err(self.not_found(RecordKind::Instructor, id));
        }
        let stored = self
            .store()
            .instructor(id)?
            .ok_or_else(|| self.not_found(RecordKind::Instructor, id))?;

        let mut instructor = instructor;
        if !principal.is_admin() {
            instructor.salary = stored.salary;
            instructor.rating = stored.rating;
            instructor.department_id = stored.department_id;
        }
        self.check_instructor(&instructor)?;

        let mut unit = UnitOfWork::new();
        unit.update(instructor.clone(), expected);
        self.commit(unit)?;

        instructor.version = bumped(expected, stored.version);
        tracing::info!(instructor_id = %id, "instructor updated");
        Ok(instructor)
    }

    /// Delete an instructor together with their course assignments.
    #[instrument(skip(self, principal), err)]
    pub fn delete_instructor(
        &self,
        principal: &Principal,
        id: InstructorId,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        self.authorize(principal, Operation::Delete, RecordKind::Instructor, None)?;
        if self.store().instructor(id)?.is_none() {
            return Err(self.not_found(RecordKind::Instructor, id));
        }

        let assignments = self.store().assignments_for_instructor(id)?;
        let mut unit = UnitOfWork::new();
        for assignment in &assignments {
            unit.delete(assignment.id, ExpectedVersion::Exact(assignment.version));
        }
        unit.delete(id, expected);
        self.commit(unit)?;

        tracing::info!(instructor_id = %id, assignments = assignments.len(), "instructor deleted");
        Ok(())
    }

    /// Whether no other instructor uses `email`.
    pub fn is_instructor_email_unique(
        &self,
        principal: &Principal,
        email: &str,
        editing: Option<InstructorId>,
    ) -> DomainResult<bool> {
        self.authorize(
            principal,
            Operation::View,
            RecordKind::Instructor,
            editing.map(InstructorId::get),
        )?;
        Ok(self
            .store()
            .instructors_by_email(email)?
            .iter()
            .all(|i| Some(i.id) == editing))
    }

    fn check_instructor(&self, instructor: &Instructor) -> DomainResult<()> {
        let department = self.store().department(instructor.department_id)?;
        let email_holders = self.store().instructors_by_email(&instructor.email)?;
        self.check(
            RecordKind::Instructor,
            self.guard().validate_instructor(
                instructor,
                &InstructorSnapshot {
                    department: department.as_ref(),
                    email_holders: &email_holders,
                },
            ),
        )
    }
}
