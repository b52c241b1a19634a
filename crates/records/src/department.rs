use serde::{Deserialize, Serialize};

use registrar_core::{DepartmentId, Record, RecordKind, Violations};

use crate::rules::{char_len, is_blank, len_between};

/// Organizational unit owning courses, instructors and students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub manager: String,
    pub location: String,
    #[serde(default)]
    pub version: u64,
}

impl Department {
    pub fn new(name: impl Into<String>, manager: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: DepartmentId::UNASSIGNED,
            name: name.into(),
            manager: manager.into(),
            location: location.into(),
            version: 0,
        }
    }

    pub fn check_shape(&self) -> Violations {
        let mut v = Violations::new();
        if is_blank(&self.name) {
            v.push("name", "Department name is required");
        } else {
            v.check(
                !len_between(&self.name, 2, 100),
                "name",
                "Name must be between 2 and 100 characters",
            );
        }
        if is_blank(&self.manager) {
            v.push("manager", "Manager name is required");
        } else {
            v.check(
                char_len(&self.manager) > 100,
                "manager",
                "Manager name cannot exceed 100 characters",
            );
        }
        if is_blank(&self.location) {
            v.push("location", "Location is required");
        } else {
            v.check(
                char_len(&self.location) > 200,
                "location",
                "Location cannot exceed 200 characters",
            );
        }
        v
    }
}

impl Record for Department {
    type Id = DepartmentId;

    const KIND: RecordKind = RecordKind::Department;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Records still referencing a department.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDependents {
    pub courses: usize,
    pub instructors: usize,
    pub students: usize,
}

impl DepartmentDependents {
    pub fn is_empty(&self) -> bool {
        self.courses == 0 && self.instructors == 0 && self.students == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_department_has_no_violations() {
        let d = Department::new("Mathematics", "Dr. Jones", "Building B");
        assert!(d.check_shape().is_empty());
    }

    #[test]
    fn reports_each_missing_field() {
        let d = Department::new("M", "", " ");
        let v = d.check_shape();
        assert!(v.has_field("name"));
        assert!(v.has_field("manager"));
        assert!(v.has_field("location"));
    }

    #[test]
    fn dependents_empty_only_when_all_zero() {
        assert!(DepartmentDependents::default().is_empty());
        let d = DepartmentDependents {
            students: 1,
            ..Default::default()
        };
        assert!(!d.is_empty());
    }
}
