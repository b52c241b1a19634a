use serde::Serialize;
use tracing::instrument;

use registrar_auth::{Operation, Principal, PrincipalContext};
use registrar_core::{DomainError, DomainResult, ExpectedVersion, RecordKind, StudentId, Violations};
use registrar_enrollment::EnrolledCourse;
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::{Department, Student, StudentSnapshot};

use crate::Registrar;
use crate::registrar::bumped;

/// A student profile with their transcript.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetails {
    pub student: Student,
    pub department: Option<Department>,
    pub courses: Vec<EnrolledCourse>,
}

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_students(&self, principal: &Principal) -> DomainResult<Vec<Student>> {
        self.authorize(principal, Operation::List, RecordKind::Student, None)?;
        Ok(self.store().students()?)
    }

    pub fn student_details(&self, principal: &Principal, id: StudentId) -> DomainResult<StudentDetails> {
        self.authorize(principal, Operation::View, RecordKind::Student, Some(id.get()))?;
        let student = self
            .store()
            .student(id)?
            .ok_or_else(|| self.not_found(RecordKind::Student, id))?;

        let mut courses = Vec::new();
        for enrollment in self.store().enrollments_for_student(id)? {
            if let Some(course) = self.store().course(enrollment.course_num)? {
                courses.push(EnrolledCourse { enrollment, course });
            }
        }
        Ok(StudentDetails {
            department: self.store().department(student.department_id)?,
            student,
            courses,
        })
    }

    /// The signed-in student's own profile.
    pub fn my_profile(&self, principal: &Principal) -> DomainResult<StudentDetails> {
        let Some(id) = principal.linked_student_id() else {
            tracing::warn!(role = %principal.role(), "profile requested without a linked student");
            return Err(DomainError::Forbidden);
        };
        self.student_details(principal, id)
    }

    /// Create a student. A nonzero id is kept as the student's number.
    #[instrument(skip(self, principal, student), fields(email = %student.email), err)]
    pub fn create_student(&self, principal: &Principal, student: Student) -> DomainResult<Student> {
        self.authorize(principal, Operation::Create, RecordKind::Student, None)?;

        let mut student = student;
        let mut violations = self.student_violations(&student)?;
        if student.id.is_assigned() {
            violations.check(
                self.store().student(student.id)?.is_some(),
                "id",
                "A student with this id already exists",
            );
        }
        self.check(RecordKind::Student, violations)?;

        let mut unit = UnitOfWork::new();
        unit.insert(student.clone());
        let receipt = self.commit(unit)?;

        student.id = receipt.student_id().unwrap_or(student.id);
        student.version = 1;
        tracing::info!(student_id = %student.id, "student created");
        Ok(student)
    }

    /// Update a student record. Students editing themselves keep their department.
    #[instrument(skip(self, principal, student), fields(role = %principal.role()), err)]
    pub fn update_student(
        &self,
        principal: &Principal,
        id: StudentId,
        student: Student,
        expected: ExpectedVersion,
    ) -> DomainResult<Student> {
        self.authorize(principal, Operation::Edit, RecordKind::Student, Some(id.get()))?;
        if student.id != id {
            return Err(self.not_found(RecordKind::Student, id));
        }
        let stored = self
            .store()
            .student(id)?
            .ok_or_else(|| self.not_found(RecordKind::Student, id))?;

        let mut student = student;
        if !principal.is_admin() {
            student.department_id = stored.department_id;
        }
        let violations = self.student_violations(&student)?;
        self.check(RecordKind::Student, violations)?;

        let mut unit = UnitOfWork::new();
        unit.update(student.clone(), expected);
        self.commit(unit)?;

        student.version = bumped(expected, stored.version);
        tracing::info!(student_id = %id, "student updated");
        Ok(student)
    }

    /// Delete a student together with all of their enrollments.
    #[instrument(skip(self, principal), err)]
    pub fn delete_student(&self, principal: &Principal, id: StudentId, expected: ExpectedVersion) -> DomainResult<()> {
        self.authorize(principal, Operation::Delete, RecordKind::Student, None)?;
        if self.store().student(id)?.is_none() {
            return Err(self.not_found(RecordKind::Student, id));
        }

        let enrollments = self.store().enrollments_for_student(id)?;
        let mut unit = UnitOfWork::new();
        for enrollment in &enrollments {
            unit.delete(enrollment.id, ExpectedVersion::Exact(enrollment.version));
        }
        unit.delete(id, expected);
        self.commit(unit)?;

        tracing::info!(student_id = %id, enrollments = enrollments.len(), "student deleted");
        Ok(())
    }

    /// Whether no other student uses `email`.
    pub fn is_student_email_unique(
        &self,
        principal: &Principal,
        email: &str,
        editing: Option<StudentId>,
    ) -> DomainResult<bool> {
        self.authorize(principal, Operation::View, RecordKind::Student, editing.map(StudentId::get))?;
        Ok(self
            .store()
            .students_by_email(email)?
            .iter()
            .all(|s| Some(s.id) == editing))
    }

    fn student_violations(&self, student: &Student) -> DomainResult<Violations> {
        let department = self.store().department(student.department_id)?;
        let email_holders = self.store().students_by_email(&student.email)?;
        Ok(self.guard().validate_student(
            student,
            &StudentSnapshot {
                department: department.as_ref(),
                email_holders: &email_holders,
            },
        ))
    }
}
