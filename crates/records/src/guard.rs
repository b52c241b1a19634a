//! Integrity rules that depend on persisted state.
//!
//! The guard is pure: callers read whatever state a rule needs, hand it over
//! as a snapshot, and get back every violation found. Nothing here touches a
//! store, so the same checks run identically in services, tests and benches.

use registrar_core::{FieldViolation, Violations};

use crate::department::DepartmentDependents;
use crate::rules::same_text;
use crate::{Course, Department, Enrollment, Instructor, SalaryPolicy, Student};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// State read before validating a course create or update.
#[derive(Debug, Clone, Copy)]
pub struct CourseSnapshot<'a> {
    /// Stored course with the same number (updates only).
    pub existing: Option<&'a Course>,
    /// Whether the stored course has any enrollment or assignment.
    pub relations_exist: bool,
    /// The department the proposal points at.
    pub department: Option<&'a Department>,
    /// Courses currently stored in that department.
    pub department_courses: &'a [Course],
}

#[derive(Debug, Clone, Copy)]
pub struct InstructorSnapshot<'a> {
    pub department: Option<&'a Department>,
    /// Instructors whose email matches the proposal, case-insensitively.
    pub email_holders: &'a [Instructor],
}

#[derive(Debug, Clone, Copy)]
pub struct StudentSnapshot<'a> {
    pub department: Option<&'a Department>,
    /// Students whose email matches the proposal, case-insensitively.
    pub email_holders: &'a [Student],
}

#[derive(Debug, Clone, Copy)]
pub struct EnrollmentSnapshot<'a> {
    pub student_exists: bool,
    pub course: Option<&'a Course>,
}

#[derive(Debug, Clone, Copy)]
pub struct AssignmentSnapshot {
    pub instructor_exists: bool,
    pub course_exists: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct IntegrityGuard {
    salary_policy: SalaryPolicy,
}

impl IntegrityGuard {
    pub fn new(salary_policy: SalaryPolicy) -> Self {
        Self { salary_policy }
    }

    pub fn salary_policy(&self) -> &SalaryPolicy {
        &self.salary_policy
    }

    pub fn validate_department(&self, proposed: &Department, same_name: &[Department]) -> Violations {
        let mut v = proposed.check_shape();
        v.check(
            same_name
                .iter()
                .any(|d| d.id != proposed.id && same_text(&d.name, &proposed.name)),
            "name",
            "A department with this name already exists",
        );
        v
    }

    /// A department may only be removed once nothing references it.
    pub fn validate_department_deletion(
        &self,
        department: &Department,
        dependents: DepartmentDependents,
    ) -> Violations {
        let mut v = Violations::new();
        if !dependents.is_empty() {
            v.push(
                "department",
                format!(
                    "Cannot delete department '{}': it still has {} course(s), {} instructor(s) and {} student(s)",
                    department.name, dependents.courses, dependents.instructors, dependents.students
                ),
            );
        }
        v
    }

    pub fn validate_course(&self, proposed: &Course, snapshot: &CourseSnapshot<'_>) -> Violations {
        let mut v = proposed.check_shape();

        if proposed.department_id.is_assigned() && snapshot.department.is_none() {
            v.push("department_id", "Selected department does not exist");
        }

        v.check(
            snapshot.department_courses.iter().any(|c| {
                c.num != proposed.num
                    && c.department_id == proposed.department_id
                    && same_text(&c.name, &proposed.name)
            }),
            "name",
            "A course with this name already exists in the selected department",
        );

        if let Some(existing) = snapshot.existing {
            v.check(
                existing.department_id != proposed.department_id && snapshot.relations_exist,
                "department_id",
                "Cannot change the department of a course that has enrollments or assignments",
            );
        }
        v
    }

    pub fn validate_instructor(&self, proposed: &Instructor, snapshot: &InstructorSnapshot<'_>) -> Violations {
        let mut v = proposed.check_shape();

        v.check(
            snapshot
                .email_holders
                .iter()
                .any(|i| i.id != proposed.id && same_text(&i.email, &proposed.email)),
            "email",
            "This email is already used by another instructor",
        );

        match snapshot.department {
            Some(department) => {
                if let Err(reason) = self.salary_policy.check(&department.name, proposed.salary) {
                    v.push("salary", reason);
                }
            }
            None if proposed.department_id.is_assigned() => {
                v.push("department_id", "Selected department does not exist");
            }
            None => {}
        }
        v
    }

    pub fn validate_student(&self, proposed: &Student, snapshot: &StudentSnapshot<'_>) -> Violations {
        let mut v = proposed.check_shape();

        v.check(
            snapshot
                .email_holders
                .iter()
                .any(|s| s.id != proposed.id && same_text(&s.email, &proposed.email)),
            "email",
            "This email is already used by another student",
        );
        v.check(
            proposed.department_id.is_assigned() && snapshot.department.is_none(),
            "department_id",
            "Selected department does not exist",
        );
        v
    }

    pub fn validate_enrollment(&self, proposed: &Enrollment, snapshot: &EnrollmentSnapshot<'_>) -> Violations {
        let mut v = Violations::new();
        v.check(!snapshot.student_exists, "student_id", "Student does not exist");
        match snapshot.course {
            Some(course) => v.extend(self.validate_grade(proposed.grade, course)),
            None => v.push("course_num", "Course does not exist"),
        }
        v
    }

    pub fn validate_assignment(&self, snapshot: &AssignmentSnapshot) -> Violations {
        let mut v = Violations::new();
        v.check(!snapshot.instructor_exists, "instructor_id", "Instructor does not exist");
        v.check(!snapshot.course_exists, "course_num", "Course does not exist");
        v
    }

    /// Grades run from 0 (ungraded) up to the course's total degree.
    pub fn validate_grade(&self, grade: u32, course: &Course) -> Violations {
        if grade > course.degree {
            FieldViolation::new(
                "grade",
                format!("Grade must be between 0 and {}", course.degree),
            )
            .into()
        } else {
            Violations::new()
        }
    }
}
