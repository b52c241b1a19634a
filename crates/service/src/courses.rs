use serde::Serialize;
use tracing::instrument;

use registrar_auth::{Operation, Principal};
use registrar_core::{CourseNum, DepartmentId, DomainResult, ExpectedVersion, RecordKind};
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::rules::same_text;
use registrar_records::{Course, CourseSnapshot, Department};

use crate::Registrar;
use crate::registrar::bumped;

/// A course with its department resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetails {
    pub course: Course,
    pub department: Option<Department>,
}

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_courses(&self, principal: &Principal) -> DomainResult<Vec<CourseDetails>> {
        self.authorize(principal, Operation::List, RecordKind::Course, None)?;
        let departments = self.store().departments()?;
        Ok(self
            .store()
            .courses()?
            .into_iter()
            .map(|course| CourseDetails {
                department: departments.iter().find(|d| d.id == course.department_id).cloned(),
                course,
            })
            .collect())
    }

    pub fn course(&self, principal: &Principal, num: CourseNum) -> DomainResult<CourseDetails> {
        self.authorize(principal, Operation::View, RecordKind::Course, None)?;
        let course = self
            .store()
            .course(num)?
            .ok_or_else(|| self.not_found(RecordKind::Course, num))?;
        Ok(CourseDetails {
            department: self.store().department(course.department_id)?,
            course,
        })
    }

    #[instrument(skip(self, principal, course), fields(name = %course.name), err)]
    pub fn create_course(&self, principal: &Principal, course: Course) -> DomainResult<Course> {
        self.authorize(principal, Operation::Create, RecordKind::Course, None)?;

        let mut course = course;
        course.num = CourseNum::UNASSIGNED;
        let department = self.store().department(course.department_id)?;
        let siblings = self.store().courses_in_department(course.department_id)?;
        self.check(
            RecordKind::Course,
            self.guard().validate_course(
                &course,
                &CourseSnapshot {
                    existing: None,
                    relations_exist: false,
                    department: department.as_ref(),
                    department_courses: &siblings,
                },
            ),
        )?;

        let mut unit = UnitOfWork::new();
        unit.insert(course.clone());
        let receipt = self.commit(unit)?;

        course.num = receipt.course_num().unwrap_or_default();
        course.version = 1;
        tracing::info!(course_num = %course.num, "course created");
        Ok(course)
    }

    /// Update a course. Its department is frozen once anything references it.
    #[instrument(skip(self, principal, course), err)]
    pub fn update_course(
        &self,
        principal: &Principal,
        num: CourseNum,
        course: Course,
        expected: ExpectedVersion,
    ) -> DomainResult<Course> {
        self.authorize(principal, Operation::Edit, RecordKind::Course, None)?;
        if course.num != num {
            return Err(self.not_found(RecordKind::Course, num));
        }
        let stored = self
            .store()
            .course(num)?
            .ok_or_else(|| self.not_found(RecordKind::Course, num))?;

        let relations_exist = self.store().course_has_relations(num)?;
        let department = self.store().department(course.department_id)?;
        let siblings = self.store().courses_in_department(course.department_id)?;
        self.check(
            RecordKind::Course,
            self.guard().validate_course(
                &course,
                &CourseSnapshot {
                    existing: Some(&stored),
                    relations_exist,
                    department: department.as_ref(),
                    department_courses: &siblings,
                },
            ),
        )?;

        let mut unit = UnitOfWork::new();
        unit.update(course.clone(), expected);
        self.commit(unit)?;

        let mut updated = course;
        updated.version = bumped(expected, stored.version);
        tracing::info!(course_num = %num, "course updated");
        Ok(updated)
    }

    /// Whether `name` is free in the department, ignoring the course being edited.
    pub fn is_course_name_unique(
        &self,
        principal: &Principal,
        name: &str,
        department_id: DepartmentId,
        editing: Option<CourseNum>,
    ) -> DomainResult<bool> {
        self.authorize(principal, Operation::View, RecordKind::Course, None)?;
        Ok(!self
            .store()
            .courses_in_department(department_id)?
            .iter()
            .any(|c| Some(c.num) != editing && same_text(&c.name, name)))
    }
}
