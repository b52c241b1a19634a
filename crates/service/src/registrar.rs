use registrar_auth::{Operation, Principal, ensure_allowed};
use registrar_core::{DomainError, DomainResult, ExpectedVersion, RecordKind, Violations};
use registrar_enrollment::EnrollmentEngine;
use registrar_infra::store::{CommitReceipt, StoreError};
use registrar_infra::{Notifier, RecordStore, RegistrarConfig, UnitOfWork};
use registrar_records::IntegrityGuard;

/// Application entry point for every registrar use case.
///
/// Mutations run authorize → validate → commit: the caller is checked against
/// the access policy before anything is read, rules are checked against reads
/// made up front, and a single unit of work is committed at the end.
pub struct Registrar<S, N> {
    store: S,
    notifier: N,
    guard: IntegrityGuard,
    config: RegistrarConfig,
}

impl<S, N> Registrar<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, config: RegistrarConfig) -> Self {
        Self {
            guard: IntegrityGuard::new(config.salary_policy.clone()),
            store,
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn guard(&self) -> &IntegrityGuard {
        &self.guard
    }

    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    /// Student self-service enrollment over the same store and rules.
    pub fn enrollment(&self) -> EnrollmentEngine<'_, S> {
        EnrollmentEngine::new(&self.store, &self.guard)
    }

    pub(crate) fn authorize(
        &self,
        principal: &Principal,
        operation: Operation,
        kind: RecordKind,
        owner: Option<u64>,
    ) -> DomainResult<()> {
        ensure_allowed(principal, operation, kind, owner).inspect_err(|_| {
            tracing::warn!(role = %principal.role(), %operation, %kind, "request forbidden");
        })
    }

    pub(crate) fn check(&self, kind: RecordKind, violations: Violations) -> DomainResult<()> {
        violations.into_result().inspect_err(|e| {
            tracing::warn!(%kind, error = %e, "rejected by validation");
        })
    }

    pub(crate) fn commit(&self, unit: UnitOfWork) -> DomainResult<CommitReceipt> {
        let changes = unit.len();
        self.store.commit(unit).map_err(|e| {
            match &e {
                StoreError::Unavailable(_) => {
                    tracing::error!(error = %e, changes, "store commit failed");
                }
                _ => tracing::warn!(error = %e, changes, "store rejected commit"),
            }
            DomainError::from(e)
        })
    }

    pub(crate) fn not_found(&self, kind: RecordKind, id: impl Into<u64>) -> DomainError {
        let err = DomainError::not_found(kind, id);
        tracing::warn!(error = %err, "lookup failed");
        err
    }
}

/// Version a record carries after a committed update.
pub(crate) fn bumped(expected: ExpectedVersion, stored: u64) -> u64 {
    match expected {
        ExpectedVersion::Exact(v) => v + 1,
        ExpectedVersion::Any => stored + 1,
    }
}
