use serde::Serialize;

use registrar_core::{DomainError, DomainResult, RecordKind};

use crate::{Operation, Principal, PrincipalContext, Role};

/// Outcome of an access decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// The policy rule that produced a decision (audit trail).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    AdminFullAccess,
    PublicDirectory,
    AnonymousRestricted,
    OwnRecord,
    OwnershipMismatch,
    AdminOnlyOperation,
    NoOwnershipRelation,
}

/// Decide whether `principal` may perform `operation` on a record of `kind`
/// owned by `target_owner_id`.
///
/// For Student and Enrollment targets the owner is the student id; for
/// Instructor targets it is the instructor id. Collection operations with no
/// single owner pass `None`.
///
/// - No IO
/// - No panics
/// - No existence checks (the decision is identical whether or not the target exists)
pub fn authorize(
    principal: &Principal,
    operation: Operation,
    target_kind: RecordKind,
    target_owner_id: Option<u64>,
) -> Decision {
    evaluate(principal, operation, target_kind, target_owner_id).0
}

/// [`authorize`], mapped onto the engine's error taxonomy.
pub fn ensure_allowed(
    principal: &Principal,
    operation: Operation,
    target_kind: RecordKind,
    target_owner_id: Option<u64>,
) -> DomainResult<()> {
    let (decision, rule) = evaluate(principal, operation, target_kind, target_owner_id);
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::debug!(
                role = %principal.role(),
                %operation,
                kind = %target_kind,
                ?rule,
                "access denied"
            );
            Err(DomainError::Forbidden)
        }
    }
}

fn evaluate(
    principal: &Principal,
    operation: Operation,
    kind: RecordKind,
    owner: Option<u64>,
) -> (Decision, PolicyRule) {
    let linked = match principal.role() {
        Role::Admin => return (Decision::Allow, PolicyRule::AdminFullAccess),
        _ if operation.is_public_on(kind) => return (Decision::Allow, PolicyRule::PublicDirectory),
        Role::Anonymous => return (Decision::Deny, PolicyRule::AnonymousRestricted),
        Role::Instructor => {
            if kind != RecordKind::Instructor {
                return (Decision::Deny, PolicyRule::NoOwnershipRelation);
            }
            if !matches!(operation, Operation::View | Operation::Edit) {
                return (Decision::Deny, PolicyRule::AdminOnlyOperation);
            }
            principal.linked_instructor_id().map(|id| id.get())
        }
        Role::Student => {
            let grantable = match kind {
                RecordKind::Student => matches!(operation, Operation::View | Operation::Edit),
                RecordKind::Enrollment => matches!(
                    operation,
                    Operation::List | Operation::View | Operation::Enroll | Operation::Drop
                ),
                _ => return (Decision::Deny, PolicyRule::NoOwnershipRelation),
            };
            if !grantable {
                return (Decision::Deny, PolicyRule::AdminOnlyOperation);
            }
            principal.linked_student_id().map(|id| id.get())
        }
    };

    match (linked, owner) {
        (Some(l), Some(o)) if l == o => (Decision::Allow, PolicyRule::OwnRecord),
        _ => (Decision::Deny, PolicyRule::OwnershipMismatch),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision, for audit logs.
///
/// Never hand this to the denied caller: it names the rule and the owner id.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub role: Role,
    pub operation: Operation,
    pub target_kind: RecordKind,
    pub target_owner_id: Option<u64>,
    pub linked_student_id: Option<u64>,
    pub linked_instructor_id: Option<u64>,
    pub decision: Decision,
    pub rule: PolicyRule,
    pub reason: String,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(
    principal: &Principal,
    operation: Operation,
    target_kind: RecordKind,
    target_owner_id: Option<u64>,
) -> AuthorizationExplanation {
    let (decision, rule) = evaluate(principal, operation, target_kind, target_owner_id);

    let reason = match rule {
        PolicyRule::AdminFullAccess => "administrators may perform every operation".to_string(),
        PolicyRule::PublicDirectory => format!("{operation} on {target_kind} is public"),
        PolicyRule::AnonymousRestricted => {
            format!("{operation} on {target_kind} requires a signed-in caller")
        }
        PolicyRule::OwnRecord => format!("caller owns the target {target_kind}"),
        PolicyRule::OwnershipMismatch => format!(
            "{} may only {operation} the {target_kind} linked to its own record",
            principal.role()
        ),
        PolicyRule::AdminOnlyOperation => {
            format!("{operation} on {target_kind} is reserved for administrators")
        }
        PolicyRule::NoOwnershipRelation => format!(
            "{} has no ownership relation to {target_kind} records",
            principal.role()
        ),
    };

    AuthorizationExplanation {
        role: principal.role(),
        operation,
        target_kind,
        target_owner_id,
        linked_student_id: principal.linked_student_id().map(|id| id.get()),
        linked_instructor_id: principal.linked_instructor_id().map(|id| id.get()),
        decision,
        rule,
        reason,
    }
}
