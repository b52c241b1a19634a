use serde::Serialize;
use tracing::instrument;

use registrar_auth::{Operation, Principal};
use registrar_core::{DepartmentId, DomainResult, ExpectedVersion, RecordKind};
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::{Course, Department, Instructor, Student};

use crate::Registrar;
use crate::registrar::bumped;

/// Public department page: the department with its members and courses.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentDetails {
    pub department: Department,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub students: Vec<Student>,
}

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn list_departments(&self, principal: &Principal) -> DomainResult<Vec<Department>> {
        self.authorize(principal, Operation::List, RecordKind::Department, None)?;
        Ok(self.store().departments()?)
    }

    pub fn department_details(&self, principal: &Principal, id: DepartmentId) -> DomainResult<DepartmentDetails> {
        self.authorize(principal, Operation::View, RecordKind::Department, None)?;
        let department = self
            .store()
            .department(id)?
            .ok_or_else(|| self.not_found(RecordKind::Department, id))?;
        Ok(DepartmentDetails {
            courses: self.store().courses_in_department(id)?,
            instructors: self.store().instructors_in_department(id)?,
            students: self.store().students_in_department(id)?,
            department,
        })
    }

    #[instrument(skip(self, principal, department), fields(name = %department.name), err)]
    pub fn create_department(&self, principal: &Principal, department: Department) -> DomainResult<Department> {
        self.authorize(principal, Operation::Create, RecordKind::Department, None)?;

        let mut department = department;
        department.id = DepartmentId::UNASSIGNED;
        let same_name = self.store().department_by_name(&department.name)?;
        self.check(
            RecordKind::Department,
            self.guard().validate_department(&department, &same_name),
        )?;

        let mut unit = UnitOfWork::new();
        unit.insert(department.clone());
        let receipt = self.commit(unit)?;

        department.id = receipt.department_id().unwrap_or_default();
        department.version = 1;
        tracing::info!(department_id = %department.id, "department created");
        Ok(department)
    }

    #[instrument(skip(self, principal, department), err)]
    pub fn update_department(
        &self,
        principal: &Principal,
        id: DepartmentId,
        department: Department,
        expected: ExpectedVersion,
    ) -> DomainResult<Department> {
        self.authorize(principal, Operation::Edit, RecordKind::Department, None)?;
        if department.id != id {
            return Err(self.not_found(RecordKind::Department, id));
        }
        let stored = self
            .store()
            .department(id)?
            .ok_or_else(|| self.not_found(RecordKind::Department, id))?;

        let same_name = self.store().department_by_name(&department.name)?;
        self.check(
            RecordKind::Department,
            self.guard().validate_department(&department, &same_name),
        )?;

        let mut unit = UnitOfWork::new();
        unit.update(department.clone(), expected);
        self.commit(unit)?;

        let mut updated = department;
        updated.version = bumped(expected, stored.version);
        tracing::info!(department_id = %id, "department updated");
        Ok(updated)
    }

    /// Remove a department that no course, instructor or student references.
    #[instrument(skip(self, principal), err)]
    pub fn delete_department(
        &self,
        principal: &Principal,
        id: DepartmentId,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        self.authorize(principal, Operation::Delete, RecordKind::Department, None)?;
        let department = self
            .store()
            .department(id)?
            .ok_or_else(|| self.not_found(RecordKind::Department, id))?;

        let dependents = self.store().department_dependents(id)?;
        self.check(
            RecordKind::Department,
            self.guard().validate_department_deletion(&department, dependents),
        )?;

        let mut unit = UnitOfWork::new();
        unit.delete(id, expected);
        self.commit(unit)?;
        tracing::info!(department_id = %id, "department deleted");
        Ok(())
    }
}
