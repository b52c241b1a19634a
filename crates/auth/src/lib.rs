//! `registrar-auth` — pure authorization boundary for the records engine.
//!
//! This crate is intentionally decoupled from HTTP, sessions and storage: it
//! decides, it never looks anything up.

pub mod account;
pub mod authorize;
pub mod operation;
pub mod principal;
pub mod roles;

pub use account::{AccountId, LinkedRecord, RegisterAccount, UserAccount};
pub use authorize::{
    AuthorizationExplanation, Decision, PolicyRule, authorize, ensure_allowed, explain_authorization,
};
pub use operation::Operation;
pub use principal::{Principal, PrincipalContext};
pub use roles::{ParseRoleError, Role};
