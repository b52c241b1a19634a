use serde::{Deserialize, Serialize};

use registrar_core::{CourseNum, DepartmentId, Record, RecordKind, Violations};

use crate::rules::{char_len, is_blank, len_between};

pub const DEGREE_RANGE: core::ops::RangeInclusive<u32> = 100..=120;
pub const MIN_DEGREE_RANGE: core::ops::RangeInclusive<u32> = 50..=60;

/// A gradable offering belonging to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub num: CourseNum,
    pub name: String,
    pub description: Option<String>,
    /// Total degree (maximum grade).
    pub degree: u32,
    /// Minimum passing degree.
    pub min_degree: u32,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub version: u64,
}

impl Course {
    pub fn new(name: impl Into<String>, degree: u32, min_degree: u32, department_id: DepartmentId) -> Self {
        Self {
            num: CourseNum::UNASSIGNED,
            name: name.into(),
            description: None,
            degree,
            min_degree,
            department_id,
            version: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `grade` reaches the passing bar.
    pub fn is_passing(&self, grade: u32) -> bool {
        grade >= self.min_degree
    }

    /// Field rules that need no persisted state.
    ///
    /// Includes `min_degree <= degree`, which holds for every stored course.
    pub fn check_shape(&self) -> Violations {
        let mut v = Violations::new();
        if is_blank(&self.name) {
            v.push("name", "Course name is required");
        } else {
            v.check(
                !len_between(&self.name, 3, 200),
                "name",
                "Course name must be between 3 and 200 characters",
            );
        }
        if let Some(description) = &self.description {
            v.check(
                char_len(description) > 500,
                "description",
                "Description cannot exceed 500 characters",
            );
        }
        v.check(
            !DEGREE_RANGE.contains(&self.degree),
            "degree",
            "Total degree must be between 100 and 120",
        );
        v.check(
            !MIN_DEGREE_RANGE.contains(&self.min_degree),
            "min_degree",
            "Minimum degree must be between 50 and 60",
        );
        v.check(
            self.min_degree > self.degree,
            "min_degree",
            "Minimum degree cannot be greater than total degree",
        );
        v.check(
            !self.department_id.is_assigned(),
            "department_id",
            "Department is required",
        );
        v
    }
}

impl Record for Course {
    type Id = CourseNum;

    const KIND: RecordKind = RecordKind::Course;

    fn id(&self) -> Self::Id {
        self.num
    }

    fn version(&self) -> u64 {
        self.version
    }
}
