use serde::{Deserialize, Serialize};

use registrar_core::{AssignmentId, CourseNum, InstructorId, Record, RecordKind};

/// An instructor teaching a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub instructor_id: InstructorId,
    pub course_num: CourseNum,
    #[serde(default)]
    pub version: u64,
}

impl Assignment {
    pub fn new(instructor_id: InstructorId, course_num: CourseNum) -> Self {
        Self {
            id: AssignmentId::UNASSIGNED,
            instructor_id,
            course_num,
            version: 0,
        }
    }
}

impl Record for Assignment {
    type Id = AssignmentId;

    const KIND: RecordKind = RecordKind::Assignment;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
