use serde::{Deserialize, Serialize};

use registrar_core::{CourseNum, EnrollmentId, Record, RecordKind, StudentId};

/// Grade value meaning "not graded yet".
pub const UNGRADED: u32 = 0;

/// A student's registration in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_num: CourseNum,
    pub grade: u32,
    #[serde(default)]
    pub version: u64,
}

impl Enrollment {
    /// A fresh, ungraded enrollment.
    pub fn new(student_id: StudentId, course_num: CourseNum) -> Self {
        Self {
            id: EnrollmentId::UNASSIGNED,
            student_id,
            course_num,
            grade: UNGRADED,
            version: 0,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.grade != UNGRADED
    }

    pub fn state(&self) -> EnrollmentState {
        if self.is_graded() {
            EnrollmentState::Graded { grade: self.grade }
        } else {
            EnrollmentState::Ungraded
        }
    }
}

impl Record for Enrollment {
    type Id = EnrollmentId;

    const KIND: RecordKind = RecordKind::Enrollment;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Lifecycle of a (student, course) pair.
///
/// ```text
/// NotEnrolled -> Ungraded -> Graded
///      ^            |
///      +---drop-----+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnrollmentState {
    NotEnrolled,
    Ungraded,
    Graded { grade: u32 },
}

impl EnrollmentState {
    pub fn is_enrolled(self) -> bool {
        !matches!(self, EnrollmentState::NotEnrolled)
    }

    /// Only an ungraded enrollment can be dropped by its student.
    pub fn can_drop(self) -> bool {
        matches!(self, EnrollmentState::Ungraded)
    }
}

/// Letter band for a numeric grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeBand {
    A,
    B,
    C,
    D,
    F,
}

impl GradeBand {
    pub fn of(grade: u32) -> Self {
        match grade {
            90.. => GradeBand::A,
            80..=89 => GradeBand::B,
            70..=79 => GradeBand::C,
            60..=69 => GradeBand::D,
            _ => GradeBand::F,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            GradeBand::A => "A",
            GradeBand::B => "B",
            GradeBand::C => "C",
            GradeBand::D => "D",
            GradeBand::F => "F",
        }
    }

    /// Presentation hint used by transcript views.
    pub fn color(self) -> &'static str {
        match self {
            GradeBand::A => "success",
            GradeBand::B => "info",
            GradeBand::C => "warning",
            GradeBand::D | GradeBand::F => "danger",
        }
    }
}

impl core::fmt::Display for GradeBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.letter())
    }
}
