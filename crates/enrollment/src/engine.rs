use serde::Serialize;
use tracing::instrument;

use registrar_auth::{Operation, Principal, ensure_allowed};
use registrar_core::{CourseNum, DomainError, DomainResult, EnrollmentId, ExpectedVersion, RecordKind, StudentId};
use registrar_infra::store::{RecordStore, UnitOfWork};
use registrar_records::{Course, Enrollment, EnrollmentSnapshot, EnrollmentState, GradeBand, IntegrityGuard};

/// An enrollment joined with its course, as shown on a student's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolledCourse {
    pub enrollment: Enrollment,
    pub course: Course,
}

impl EnrolledCourse {
    /// Letter band, once graded.
    pub fn band(&self) -> Option<GradeBand> {
        self.enrollment.is_graded().then(|| GradeBand::of(self.enrollment.grade))
    }

    /// Whether the grade reaches the course's passing bar, once graded.
    pub fn passed(&self) -> Option<bool> {
        self.enrollment
            .is_graded()
            .then(|| self.course.is_passing(self.enrollment.grade))
    }
}

/// Enroll/drop state machine for (student, course) pairs.
///
/// Every call authorizes the principal before reading anything, then
/// validates against reads and commits a single unit of work.
pub struct EnrollmentEngine<'s, S: ?Sized> {
    store: &'s S,
    guard: &'s IntegrityGuard,
}

impl<'s, S> EnrollmentEngine<'s, S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: &'s S, guard: &'s IntegrityGuard) -> Self {
        Self { store, guard }
    }

    /// Register a student in a course with an ungraded enrollment.
    ///
    /// Students may enroll in any course regardless of department.
    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn enroll(&self, principal: &Principal, student_id: StudentId, course_num: CourseNum) -> DomainResult<Enrollment> {
        ensure_allowed(principal, Operation::Enroll, RecordKind::Enrollment, Some(student_id.get()))?;

        let course = self
            .store
            .course(course_num)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Course, course_num))?;
        if self.store.student(student_id)?.is_none() {
            return Err(DomainError::not_found(RecordKind::Student, student_id));
        }
        if self.store.enrollment_for(student_id, course_num)?.is_some() {
            return Err(DomainError::duplicate(format!(
                "student {student_id} is already enrolled in course {course_num}"
            )));
        }

        let mut enrollment = Enrollment::new(student_id, course_num);
        self.guard
            .validate_enrollment(
                &enrollment,
                &EnrollmentSnapshot {
                    student_exists: true,
                    course: Some(&course),
                },
            )
            .into_result()?;

        let mut unit = UnitOfWork::new();
        unit.insert(enrollment.clone());
        let receipt = self.store.commit(unit)?;

        enrollment.id = receipt.enrollment_id().unwrap_or(EnrollmentId::UNASSIGNED);
        enrollment.version = 1;
        tracing::info!(enrollment_id = %enrollment.id, "student enrolled");
        Ok(enrollment)
    }

    /// Remove an ungraded enrollment.
    ///
    /// Dropping a course the student is not enrolled in reports the course as
    /// not found; a graded enrollment is a conflict.
    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn drop(&self, principal: &Principal, student_id: StudentId, course_num: CourseNum) -> DomainResult<()> {
        ensure_allowed(principal, Operation::Drop, RecordKind::Enrollment, Some(student_id.get()))?;

        let enrollment = self
            .store
            .enrollment_for(student_id, course_num)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Course, course_num))?;
        if !enrollment.state().can_drop() {
            return Err(DomainError::conflict(format!(
                "enrollment in course {course_num} cannot be dropped after grading"
            )));
        }

        let mut unit = UnitOfWork::new();
        unit.delete(enrollment.id, ExpectedVersion::Exact(enrollment.version));
        self.store.commit(unit)?;

        tracing::info!(enrollment_id = %enrollment.id, "enrollment dropped");
        Ok(())
    }

    /// Courses the student is not enrolled in, from every department.
    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn available_courses(&self, principal: &Principal, student_id: StudentId) -> DomainResult<Vec<Course>> {
        ensure_allowed(principal, Operation::List, RecordKind::Enrollment, Some(student_id.get()))?;

        let enrolled: Vec<CourseNum> = self
            .store
            .enrollments_for_student(student_id)?
            .into_iter()
            .map(|e| e.course_num)
            .collect();
        Ok(self
            .store
            .courses()?
            .into_iter()
            .filter(|c| !enrolled.contains(&c.num))
            .collect())
    }

    /// The student's enrollments joined with their courses.
    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn my_courses(&self, principal: &Principal, student_id: StudentId) -> DomainResult<Vec<EnrolledCourse>> {
        ensure_allowed(principal, Operation::List, RecordKind::Enrollment, Some(student_id.get()))?;

        let mut out = Vec::new();
        for enrollment in self.store.enrollments_for_student(student_id)? {
            match self.store.course(enrollment.course_num)? {
                Some(course) => out.push(EnrolledCourse { enrollment, course }),
                None => tracing::warn!(enrollment_id = %enrollment.id, "enrollment references a missing course"),
            }
        }
        Ok(out)
    }

    /// Set or clear (grade 0) the grade of an enrollment. Admin only.
    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn grade(&self, principal: &Principal, enrollment_id: EnrollmentId, grade: u32) -> DomainResult<Enrollment> {
        ensure_allowed(principal, Operation::Grade, RecordKind::Enrollment, None)?;

        let mut enrollment = self
            .store
            .enrollment(enrollment_id)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Enrollment, enrollment_id))?;
        let course = self
            .store
            .course(enrollment.course_num)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Course, enrollment.course_num))?;
        self.guard.validate_grade(grade, &course).into_result()?;

        let expected = ExpectedVersion::Exact(enrollment.version);
        enrollment.grade = grade;
        let mut unit = UnitOfWork::new();
        unit.update(enrollment.clone(), expected);
        self.store.commit(unit)?;

        enrollment.version += 1;
        tracing::info!(enrollment_id = %enrollment.id, grade, "enrollment graded");
        Ok(enrollment)
    }

    #[instrument(skip(self, principal), fields(role = %principal.role()), err)]
    pub fn state(&self, principal: &Principal, student_id: StudentId, course_num: CourseNum) -> DomainResult<EnrollmentState> {
        ensure_allowed(principal, Operation::View, RecordKind::Enrollment, Some(student_id.get()))?;

        Ok(self
            .store
            .enrollment_for(student_id, course_num)?
            .map(|e| e.state())
            .unwrap_or(EnrollmentState::NotEnrolled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use registrar_core::{ConflictKind, DepartmentId};
    use registrar_infra::store::{EnrollmentReader, InMemoryRecordStore};
    use registrar_records::{Department, Student};

    struct Campus {
        store: InMemoryRecordStore,
        guard: IntegrityGuard,
        student: StudentId,
        courses: Vec<CourseNum>,
    }

    /// Two departments, one course in each, one student in the first.
    fn campus() -> Campus {
        let store = InMemoryRecordStore::new();
        let mut unit = UnitOfWork::new();
        unit.insert(Department::new("Computer Science", "Dr. Smith", "Building A"))
            .insert(Department::new("Physics", "Dr. Brown", "Building C"));
        store.commit(unit).unwrap();
        let (cs, physics) = (DepartmentId::new(1), DepartmentId::new(2));

        let mut unit = UnitOfWork::new();
        unit.insert(Course::new("Intro to Programming", 100, 50, cs))
            .insert(Course::new("Classical Mechanics", 120, 60, physics))
            .insert(Student {
                id: StudentId::UNASSIGNED,
                name: "Aisha Khan".to_string(),
                email: "aisha.khan@example.com".to_string(),
                address: "123 Main St".to_string(),
                gender: "Female".to_string(),
                age: 21,
                image: None,
                department_id: cs,
                version: 0,
            });
        let receipt = store.commit(unit).unwrap();
        let courses = receipt
            .inserted()
            .iter()
            .filter(|(k, _)| *k == RecordKind::Course)
            .map(|(_, id)| CourseNum::new(*id))
            .collect();

        Campus {
            student: receipt.student_id().unwrap(),
            store,
            guard: IntegrityGuard::default(),
            courses,
        }
    }

    #[test]
    fn enroll_then_duplicate_is_conflict() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        let e = engine.enroll(&me, c.student, c.courses[0]).unwrap();
        assert_eq!(e.grade, 0);
        assert!(e.id.is_assigned());
        assert_eq!(engine.state(&me, c.student, c.courses[0]).unwrap(), EnrollmentState::Ungraded);

        let err = engine.enroll(&me, c.student, c.courses[0]).unwrap_err();
        assert_eq!(err.conflict_kind(), Some(ConflictKind::Duplicate));
    }

    #[test]
    fn unknown_course_is_not_found() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let err = engine
            .enroll(&Principal::student(c.student), c.student, CourseNum::new(999))
            .unwrap_err();
        assert_eq!(err, DomainError::not_found(RecordKind::Course, 999u64));
    }

    #[test]
    fn drop_before_grading_returns_to_not_enrolled() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        engine.enroll(&me, c.student, c.courses[1]).unwrap();
        engine.drop(&me, c.student, c.courses[1]).unwrap();
        assert_eq!(engine.state(&me, c.student, c.courses[1]).unwrap(), EnrollmentState::NotEnrolled);

        let err = engine.drop(&me, c.student, c.courses[1]).unwrap_err();
        assert_eq!(err, DomainError::not_found(RecordKind::Course, c.courses[1]));
    }

    #[test]
    fn graded_enrollment_cannot_be_dropped() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        let e = engine.enroll(&me, c.student, c.courses[0]).unwrap();
        let graded = engine.grade(&Principal::admin(), e.id, 85).unwrap();
        assert_eq!(graded.version, 2);
        assert_eq!(
            engine.state(&me, c.student, c.courses[0]).unwrap(),
            EnrollmentState::Graded { grade: 85 }
        );

        let err = engine.drop(&me, c.student, c.courses[0]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict { kind: ConflictKind::Rule, ref message } if message.contains("cannot be dropped after grading")
        ));
        assert!(c.store.enrollment(e.id).unwrap().is_some());
    }

    #[test]
    fn only_admin_grades_and_within_degree() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);
        let e = engine.enroll(&me, c.student, c.courses[0]).unwrap();

        assert_eq!(engine.grade(&me, e.id, 90).unwrap_err(), DomainError::Forbidden);
        let err = engine.grade(&Principal::admin(), e.id, 101).unwrap_err();
        assert!(err.violations().unwrap().has_field("grade"));

        // Grading back to zero reopens the drop.
        engine.grade(&Principal::admin(), e.id, 70).unwrap();
        engine.grade(&Principal::admin(), e.id, 0).unwrap();
        engine.drop(&me, c.student, c.courses[0]).unwrap();
    }

    #[test]
    fn other_students_are_forbidden_before_any_lookup() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let intruder = Principal::student(StudentId::new(c.student.get() + 100));

        assert_eq!(
            engine.enroll(&intruder, c.student, CourseNum::new(999)).unwrap_err(),
            DomainError::Forbidden
        );
        assert_eq!(
            engine.available_courses(&intruder, c.student).unwrap_err(),
            DomainError::Forbidden
        );
        assert_eq!(
            engine.enroll(&Principal::anonymous(), c.student, c.courses[0]).unwrap_err(),
            DomainError::Forbidden
        );
    }

    #[test]
    fn available_courses_excludes_enrolled_and_spans_departments() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        assert_eq!(engine.available_courses(&me, c.student).unwrap().len(), 2);
        engine.enroll(&me, c.student, c.courses[0]).unwrap();
        let left = engine.available_courses(&me, c.student).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].num, c.courses[1]);
    }

    #[test]
    fn my_courses_reports_bands_once_graded() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        let e = engine.enroll(&me, c.student, c.courses[0]).unwrap();
        engine.enroll(&me, c.student, c.courses[1]).unwrap();
        engine.grade(&Principal::admin(), e.id, 45).unwrap();

        let mine = engine.my_courses(&me, c.student).unwrap();
        assert_eq!(mine.len(), 2);
        let graded = mine.iter().find(|m| m.enrollment.id == e.id).unwrap();
        assert_eq!(graded.band(), Some(GradeBand::F));
        assert_eq!(graded.passed(), Some(false));
        assert!(mine.iter().any(|m| m.band().is_none()));
    }

    #[test]
    fn store_failure_leaves_no_enrollment() {
        let c = campus();
        let engine = EnrollmentEngine::new(&c.store, &c.guard);
        let me = Principal::student(c.student);

        c.store.poison_next_commit();
        let err = engine.enroll(&me, c.student, c.courses[0]).unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        assert_eq!(engine.state(&me, c.student, c.courses[0]).unwrap(), EnrollmentState::NotEnrolled);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

        #[test]
        fn enrollment_ignores_department_membership(pick in 0usize..2, admin in any::<bool>()) {
            let c = campus();
            let engine = EnrollmentEngine::new(&c.store, &c.guard);
            let principal = if admin { Principal::admin() } else { Principal::student(c.student) };

            let e = engine.enroll(&principal, c.student, c.courses[pick]);
            prop_assert!(e.is_ok());
            prop_assert_eq!(
                engine.state(&principal, c.student, c.courses[pick]).unwrap(),
                EnrollmentState::Ungraded
            );
        }
    }
}
