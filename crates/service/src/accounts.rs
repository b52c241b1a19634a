use tracing::instrument;
use uuid::Uuid;

use registrar_auth::{AccountId, Operation, Principal, RegisterAccount, UserAccount};
use registrar_core::{DomainError, DomainResult, ExpectedVersion, InstructorId, RecordKind, StudentId};
use registrar_infra::{Notifier, RecordStore, UnitOfWork};
use registrar_records::{Instructor, InstructorSnapshot, Student, StudentSnapshot};

use crate::Registrar;

const CONFIRMATION_SUBJECT: &str = "Confirm your email";

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    /// Self-registration.
    ///
    /// The account is stored unconfirmed and a confirmation link is mailed.
    /// A failed notification is logged; the registration still stands.
    #[instrument(skip(self, cmd), fields(email = %cmd.email, role = %cmd.role), err)]
    pub fn register_account(&self, cmd: RegisterAccount) -> DomainResult<UserAccount> {
        let mut account = UserAccount::register(cmd)?;
        if self.store().account_by_email(&account.email)?.is_some() {
            return Err(DomainError::invalid_field("email", "This email is already registered"));
        }

        let mut unit = UnitOfWork::new();
        unit.insert(account.clone());
        self.commit(unit)?;
        account.version = 1;
        tracing::info!(account_id = %account.id, "account registered");

        if let Some(token) = account.confirmation_token {
            let link = self.config().confirmation_link(account.id, token);
            let body = format!(
                "<h2>Welcome to the registrar!</h2>\
                 <p>Please confirm your email by clicking the link below:</p>\
                 <p><a href='{link}'>Confirm Email</a></p>"
            );
            if let Err(e) = self.notifier().send(&account.email, CONFIRMATION_SUBJECT, &body) {
                tracing::error!(account_id = %account.id, error = %e, "failed to send confirmation email");
            }
        }
        Ok(account)
    }

    #[instrument(skip(self, token), err)]
    pub fn confirm_email(&self, account_id: AccountId, token: Uuid) -> DomainResult<UserAccount> {
        let mut account = self.load_account(account_id)?;
        let expected = ExpectedVersion::Exact(account.version);
        account.confirm_email(token)?;

        let mut unit = UnitOfWork::new();
        unit.update(account.clone(), expected);
        self.commit(unit)?;

        account.version += 1;
        tracing::info!(account_id = %account.id, "email confirmed");
        Ok(account)
    }

    /// Resolve the caller an account acts as.
    pub fn principal_for(&self, account_id: AccountId) -> DomainResult<Principal> {
        Ok(self.load_account(account_id)?.principal())
    }

    /// Create the student record for a student account and link the two.
    #[instrument(skip(self, principal, student), err)]
    pub fn provision_student(
        &self,
        principal: &Principal,
        account_id: AccountId,
        student: Student,
    ) -> DomainResult<(UserAccount, Student)> {
        self.authorize(principal, Operation::Create, RecordKind::Student, None)?;
        let mut account = self.load_account(account_id)?;

        let mut student = student;
        let department = self.store().department(student.department_id)?;
        let email_holders = self.store().students_by_email(&student.email)?;
        let mut violations = self.guard().validate_student(
            &student,
            &StudentSnapshot {
                department: department.as_ref(),
                email_holders: &email_holders,
            },
        );
        if student.id.is_assigned() {
            violations.check(
                self.store().student(student.id)?.is_some(),
                "id",
                "A student with this id already exists",
            );
        }
        self.check(RecordKind::Student, violations)?;

        if !student.id.is_assigned() {
            student.id = StudentId::new(self.store().reserve_id(RecordKind::Student)?);
        }
        let expected = ExpectedVersion::Exact(account.version);
        account.link_student(student.id)?;

        let mut unit = UnitOfWork::new();
        unit.insert(student.clone()).update(account.clone(), expected);
        self.commit(unit)?;

        student.version = 1;
        account.version += 1;
        tracing::info!(account_id = %account.id, student_id = %student.id, "student provisioned");
        Ok((account, student))
    }

    /// Create the instructor record for an instructor account and link the two.
    #[instrument(skip(self, principal, instructor), err)]
    pub fn provision_instructor(
        &self,
        principal: &Principal,
        account_id: AccountId,
        instructor: Instructor,
    ) -> DomainResult<(UserAccount, Instructor)> {
        self.authorize(principal, Operation::Create, RecordKind::Instructor, None)?;
        let mut account = self.load_account(account_id)?;

        let mut instructor = instructor;
        instructor.id = InstructorId::UNASSIGNED;
        let department = self.store().department(instructor.department_id)?;
        let email_holders = self.store().instructors_by_email(&instructor.email)?;
        let violations = self.guard().validate_instructor(
            &instructor,
            &InstructorSnapshot {
                department: department.as_ref(),
                email_holders: &email_holders,
            },
        );
        self.check(RecordKind::Instructor, violations)?;

        instructor.id = InstructorId::new(self.store().reserve_id(RecordKind::Instructor)?);
        let expected = ExpectedVersion::Exact(account.version);
        account.link_instructor(instructor.id)?;

        let mut unit = UnitOfWork::new();
        unit.insert(instructor.clone()).update(account.clone(), expected);
        self.commit(unit)?;

        instructor.version = 1;
        account.version += 1;
        tracing::info!(account_id = %account.id, instructor_id = %instructor.id, "instructor provisioned");
        Ok((account, instructor))
    }

    fn load_account(&self, id: AccountId) -> DomainResult<UserAccount> {
        self.store().account(id)?.ok_or_else(|| {
            tracing::warn!(account_id = %id, "account not found");
            DomainError::not_found(RecordKind::Account, 0u64)
        })
    }
}
