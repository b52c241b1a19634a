use serde::{Deserialize, Serialize};

use registrar_core::{InstructorId, StudentId};

use crate::Role;

/// Port through which the engine learns who is calling.
///
/// Implemented by whatever owns sessions (cookie auth, tokens, test fixtures).
pub trait PrincipalContext {
    fn current_role(&self) -> Role;
    fn linked_student_id(&self) -> Option<StudentId>;
    fn linked_instructor_id(&self) -> Option<InstructorId>;
}

/// A resolved caller snapshot used for authorization decisions.
///
/// Carries at most one linkage. Construction of this object is decoupled from
/// storage and transport: anything implementing [`PrincipalContext`] converts
/// into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    role: Role,
    student_id: Option<StudentId>,
    instructor_id: Option<InstructorId>,
}

impl Principal {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            student_id: None,
            instructor_id: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            role: Role::Anonymous,
            student_id: None,
            instructor_id: None,
        }
    }

    pub fn student(id: StudentId) -> Self {
        Self {
            role: Role::Student,
            student_id: Some(id),
            instructor_id: None,
        }
    }

    pub fn instructor(id: InstructorId) -> Self {
        Self {
            role: Role::Instructor,
            student_id: None,
            instructor_id: Some(id),
        }
    }

    /// A signed-in caller with a role but no linked record yet
    /// (e.g. a freshly registered account before provisioning).
    pub fn unlinked(role: Role) -> Self {
        Self {
            role,
            student_id: None,
            instructor_id: None,
        }
    }

    /// Snapshot an arbitrary context.
    ///
    /// Only the linkage matching the role is kept, so a context that reports
    /// both linkages can never act through the one its role does not own.
    pub fn from_context<C: PrincipalContext + ?Sized>(ctx: &C) -> Self {
        let role = ctx.current_role();
        Self {
            role,
            student_id: if role == Role::Student {
                ctx.linked_student_id()
            } else {
                None
            },
            instructor_id: if role == Role::Instructor {
                ctx.linked_instructor_id()
            } else {
                None
            },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl PrincipalContext for Principal {
    fn current_role(&self) -> Role {
        self.role
    }

    fn linked_student_id(&self) -> Option<StudentId> {
        self.student_id
    }

    fn linked_instructor_id(&self) -> Option<InstructorId> {
        self.instructor_id
    }
}
