use tracing::instrument;

use registrar_auth::{Operation, Principal};
use registrar_core::{AssignmentId, DomainError, DomainResult, EnrollmentId, ExpectedVersion, RecordKind};
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::{Assignment, AssignmentSnapshot, Enrollment, EnrollmentSnapshot};

use crate::Registrar;

// ─────────────────────────────────────────────────────────────────────────────
// Enrollments (administration)
// ─────────────────────────────────────────────────────────────────────────────

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_enrollments(&self, principal: &Principal) -> DomainResult<Vec<Enrollment>> {
        self.authorize(principal, Operation::List, RecordKind::Enrollment, None)?;
        Ok(self.store().enrollments()?)
    }

    /// Enroll on a student's behalf. Unlike self-service this may carry an
    /// initial grade.
    #[instrument(skip(self, principal, enrollment), fields(student_id = %enrollment.student_id, course_num = %enrollment.course_num), err)]
    pub fn create_enrollment(&self, principal: &Principal, enrollment: Enrollment) -> DomainResult<Enrollment> {
        self.authorize(principal, Operation::Create, RecordKind::Enrollment, None)?;

        let mut enrollment = enrollment;
        enrollment.id = EnrollmentId::UNASSIGNED;
        let student_exists = self.store().student(enrollment.student_id)?.is_some();
        let course = self.store().course(enrollment.course_num)?;
        self.check(
            RecordKind::Enrollment,
            self.guard().validate_enrollment(
                &enrollment,
                &EnrollmentSnapshot {
                    student_exists,
                    course: course.as_ref(),
                },
            ),
        )?;
        if self
            .store()
            .enrollment_for(enrollment.student_id, enrollment.course_num)?
            .is_some()
        {
            tracing::warn!("duplicate enrollment rejected");
            return Err(DomainError::duplicate(format!(
                "student {} is already enrolled in course {}",
                enrollment.student_id, enrollment.course_num
            )));
        }

        let mut unit = UnitOfWork::new();
        unit.insert(enrollment.clone());
        let receipt = self.commit(unit)?;

        enrollment.id = receipt.enrollment_id().unwrap_or_default();
        enrollment.version = 1;
        tracing::info!(enrollment_id = %enrollment.id, "enrollment created");
        Ok(enrollment)
    }

    /// Administrative removal; allowed whether or not the enrollment is graded.
    #[instrument(skip(self, principal), err)]
    pub fn delete_enrollment(
        &self,
        principal: &Principal,
        id: EnrollmentId,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        self.authorize(principal, Operation::Delete, RecordKind::Enrollment, None)?;
        if self.store().enrollment(id)?.is_none() {
            return Err(self.not_found(RecordKind::Enrollment, id));
        }

        let mut unit = UnitOfWork::new();
        unit.delete(id, expected);
        self.commit(unit)?;
        tracing::info!(enrollment_id = %id, "enrollment deleted");
        Ok(())
    }

    pub fn set_grade(&self, principal: &Principal, id: EnrollmentId, grade: u32) -> DomainResult<Enrollment> {
        self.enrollment().grade(principal, id, grade)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assignments
// ─────────────────────────────────────────────────────────────────────────────

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_assignments(&self, principal: &Principal) -> DomainResult<Vec<Assignment>> {
        self.authorize(principal, Operation::List, RecordKind::Assignment, None)?;
        Ok(self.store().assignments()?)
    }

    #[instrument(skip(self, principal, assignment), fields(instructor_id = %assignment.instructor_id, course_num = %assignment.course_num), err)]
    pub fn create_assignment(&self, principal: &Principal, assignment: Assignment) -> DomainResult<Assignment> {
        self.authorize(principal, Operation::Create, RecordKind::Assignment, None)?;

        let mut assignment = assignment;
        assignment.id = AssignmentId::UNASSIGNED;
        let instructor_exists = self.store().instructor(assignment.instructor_id)?.is_some();
        let course_exists = self.store().course(assignment.course_num)?.is_some();
        self.check(
            RecordKind::Assignment,
            self.guard().validate_assignment(&AssignmentSnapshot {
                instructor_exists,
                course_exists,
            }),
        )?;
        if self
            .store()
            .assignment_for(assignment.instructor_id, assignment.course_num)?
            .is_some()
        {
            tracing::warn!("duplicate assignment rejected");
            return Err(DomainError::duplicate(format!(
                "instructor {} is already assigned to course {}",
                assignment.instructor_id, assignment.course_num
            )));
        }

        let mut unit = UnitOfWork::new();
        unit.insert(assignment.clone());
        let receipt = self.commit(unit)?;

        assignment.id = receipt.assignment_id().unwrap_or_default();
        assignment.version = 1;
        tracing::info!(assignment_id = %assignment.id, "assignment created");
        Ok(assignment)
    }

    #[instrument(skip(self, principal), err)]
    pub fn delete_assignment(
        &self,
        principal: &Principal,
        id: AssignmentId,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        self.authorize(principal, Operation::Delete, RecordKind::Assignment, None)?;
        if self.store().assignment(id)?.is_none() {
            return Err(self.not_found(RecordKind::Assignment, id));
        }

        let mut unit = UnitOfWork::new();
        unit.delete(id, expected);
        self.commit(unit)?;
        tracing::info!(assignment_id = %id, "assignment deleted");
        Ok(())
    }
}
