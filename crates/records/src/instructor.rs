use serde::{Deserialize, Serialize};

use registrar_core::{DepartmentId, InstructorId, Record, RecordKind, Violations};

use crate::rules::{char_len, is_blank, is_valid_email, len_between};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: InstructorId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub age: u32,
    pub salary: u64,
    /// Degree rating, 0 to 100.
    pub rating: u32,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub version: u64,
}

impl Instructor {
    pub fn check_shape(&self) -> Violations {
        let mut v = Violations::new();
        if is_blank(&self.name) {
            v.push("name", "Instructor name is required");
        } else {
            v.check(
                !len_between(&self.name, 3, 100),
                "name",
                "Name must be between 3 and 100 characters",
            );
        }
        if is_blank(&self.email) {
            v.push("email", "Email is required");
        } else {
            v.check(!is_valid_email(&self.email), "email", "Invalid email address");
        }
        if is_blank(&self.address) {
            v.push("address", "Address is required");
        } else {
            v.check(
                char_len(&self.address) > 200,
                "address",
                "Address cannot exceed 200 characters",
            );
        }
        v.check(
            !(25..=70).contains(&self.age),
            "age",
            "Instructor age must be between 25 and 70",
        );
        v.check(
            self.rating > 100,
            "rating",
            "Degree rating must be between 0 and 100",
        );
        v.check(
            !self.department_id.is_assigned(),
            "department_id",
            "Department is required",
        );
        v
    }
}

impl Record for Instructor {
    type Id = InstructorId;

    const KIND: RecordKind = RecordKind::Instructor;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instructor() -> Instructor {
        Instructor {
            id: InstructorId::UNASSIGNED,
            name: "Mona Adel".to_string(),
            email: "mona.adel@example.com".to_string(),
            address: "12 Nile Street".to_string(),
            age: 40,
            salary: 9000,
            rating: 80,
            department_id: DepartmentId::new(1),
            version: 0,
        }
    }

    #[test]
    fn valid_instructor_passes() {
        assert!(instructor().check_shape().is_empty());
    }

    #[test]
    fn age_and_rating_bounds() {
        let mut i = instructor();
        i.age = 24;
        i.rating = 101;
        let v = i.check_shape();
        assert!(v.has_field("age"));
        assert!(v.has_field("rating"));

        i.age = 70;
        i.rating = 100;
        assert!(i.check_shape().is_empty());
    }

    #[test]
    fn email_must_look_like_an_address() {
        let mut i = instructor();
        i.email = "mona.adel".to_string();
        assert!(i.check_shape().has_field("email"));
    }
}
