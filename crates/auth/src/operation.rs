use serde::{Deserialize, Serialize};

use registrar_core::RecordKind;

/// Operation a caller attempts against a record kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    View,
    Create,
    Edit,
    Delete,
    Enroll,
    Drop,
    Grade,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::View => "view",
            Operation::Create => "create",
            Operation::Edit => "edit",
            Operation::Delete => "delete",
            Operation::Enroll => "enroll",
            Operation::Drop => "drop",
            Operation::Grade => "grade",
        }
    }

    /// Operations open to every caller, signed in or not.
    ///
    /// Only the department directory (listing and detail) is public.
    pub fn is_public_on(self, kind: RecordKind) -> bool {
        kind == RecordKind::Department && matches!(self, Operation::List | Operation::View)
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
