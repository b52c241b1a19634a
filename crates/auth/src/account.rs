//! User accounts and their one-time linkage to a Student or Instructor record.
//!
//! Credentials and sessions live elsewhere; this module owns only the facts the
//! access policy needs: the role, whether the email is confirmed, and which
//! record (if any) the account speaks for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use registrar_core::{DomainError, InstructorId, Record, RecordKind, StudentId, Violations, is_valid_email};

use crate::{Principal, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Account ID
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccountId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linkage
// ─────────────────────────────────────────────────────────────────────────────

/// The record an account speaks for. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkedRecord {
    Student(StudentId),
    Instructor(InstructorId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// Self-registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

/// A user account.
///
/// # Invariants
/// - Linkage is set at most once and must match the account role.
/// - Self-registration cannot create administrators.
/// - An unconfirmed account acts as an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: AccountId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub email_confirmed: bool,
    pub confirmation_token: Option<Uuid>,
    pub linked: Option<LinkedRecord>,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl UserAccount {
    /// Validate a self-registration and build the (unconfirmed) account.
    pub fn register(cmd: RegisterAccount) -> Result<Self, DomainError> {
        let mut v = Violations::new();
        let first = cmd.first_name.trim();
        let last = cmd.last_name.trim();

        v.check(first.is_empty(), "first_name", "First name is required");
        v.check(first.chars().count() > 100, "first_name", "First name cannot exceed 100 characters");
        v.check(last.is_empty(), "last_name", "Last name is required");
        v.check(last.chars().count() > 100, "last_name", "Last name cannot exceed 100 characters");
        v.check(!is_valid_email(&cmd.email), "email", "Invalid email address");
        // Privilege escalation: nobody registers their way into Admin.
        v.check(
            !matches!(cmd.role, Role::Student | Role::Instructor),
            "role",
            "Role must be Student or Instructor",
        );
        v.into_result()?;

        Ok(Self {
            id: AccountId::new(),
            email: cmd.email.trim().to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role: cmd.role,
            email_confirmed: false,
            confirmation_token: Some(Uuid::now_v7()),
            linked: None,
            created_at: cmd.occurred_at,
            version: 0,
        })
    }

    /// Accounts created by administrators (seeding, provisioning) skip
    /// confirmation.
    pub fn confirmed(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            email_confirmed: true,
            confirmation_token: None,
            linked: None,
            created_at: now,
            version: 0,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn confirm_email(&mut self, token: Uuid) -> Result<(), DomainError> {
        if self.email_confirmed {
            return Err(DomainError::conflict("email already confirmed"));
        }
        match self.confirmation_token {
            Some(expected) if expected == token => {
                self.email_confirmed = true;
                self.confirmation_token = None;
                Ok(())
            }
            _ => Err(DomainError::invalid_field("token", "Invalid confirmation token")),
        }
    }

    pub fn link_student(&mut self, id: StudentId) -> Result<(), DomainError> {
        self.ensure_linkable(Role::Student)?;
        self.linked = Some(LinkedRecord::Student(id));
        Ok(())
    }

    pub fn link_instructor(&mut self, id: InstructorId) -> Result<(), DomainError> {
        self.ensure_linkable(Role::Instructor)?;
        self.linked = Some(LinkedRecord::Instructor(id));
        Ok(())
    }

    fn ensure_linkable(&self, expected: Role) -> Result<(), DomainError> {
        if self.role != expected {
            return Err(DomainError::invalid_field(
                "role",
                format!("only {expected} accounts can be linked to a {} record", expected.as_str().to_lowercase()),
            ));
        }
        if self.linked.is_some() {
            return Err(DomainError::conflict(format!(
                "{} {} is already linked",
                RecordKind::Account,
                self.id
            )));
        }
        Ok(())
    }

    pub fn linked_student_id(&self) -> Option<StudentId> {
        match self.linked {
            Some(LinkedRecord::Student(id)) => Some(id),
            _ => None,
        }
    }

    pub fn linked_instructor_id(&self) -> Option<InstructorId> {
        match self.linked {
            Some(LinkedRecord::Instructor(id)) => Some(id),
            _ => None,
        }
    }

    /// The caller this account acts as.
    pub fn principal(&self) -> Principal {
        if !self.email_confirmed {
            return Principal::anonymous();
        }
        match (self.role, self.linked) {
            (Role::Student, Some(LinkedRecord::Student(id))) => Principal::student(id),
            (Role::Instructor, Some(LinkedRecord::Instructor(id))) => Principal::instructor(id),
            (role, _) => Principal::unlinked(role),
        }
    }
}

impl Record for UserAccount {
    type Id = AccountId;

    const KIND: RecordKind = RecordKind::Account;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
