use serde::{Deserialize, Serialize};

use registrar_core::{DepartmentId, Record, RecordKind, StudentId, Violations};

use crate::rules::{is_blank, is_letters_and_spaces, is_valid_email, len_between};

/// Exactly `Male` or `Female`, matched case-sensitively when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Parse form input; anything other than the two exact spellings is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl core::fmt::Display for Gender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student record. `gender` stays a string so bad input can be reported as
/// a field violation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub gender: String,
    pub age: u32,
    pub image: Option<String>,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub version: u64,
}

impl Student {
    pub fn gender(&self) -> Option<Gender> {
        Gender::parse(&self.gender)
    }

    pub fn check_shape(&self) -> Violations {
        let mut v = Violations::new();
        if is_blank(&self.name) {
            v.push("name", "Student name is required");
        } else {
            v.check(
                !len_between(&self.name, 3, 100),
                "name",
                "Name must be between 3 and 100 characters",
            );
            v.check(
                !is_letters_and_spaces(&self.name),
                "name",
                "Name can only contain letters and spaces",
            );
        }
        if is_blank(&self.email) {
            v.push("email", "Email is required");
        } else {
            v.check(!is_valid_email(&self.email), "email", "Invalid email format");
        }
        if is_blank(&self.address) {
            v.push("address", "Address is required");
        } else {
            v.check(
                !len_between(&self.address, 5, 200),
                "address",
                "Address must be between 5 and 200 characters",
            );
        }
        v.check(
            self.gender().is_none(),
            "gender",
            "Gender must be either Male or Female",
        );
        v.check(
            !(16..=100).contains(&self.age),
            "age",
            "Age must be between 16 and 100",
        );
        v.check(
            !self.department_id.is_assigned(),
            "department_id",
            "Department is required",
        );
        v
    }
}

impl Record for Student {
    type Id = StudentId;

    const KIND: RecordKind = RecordKind::Student;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
