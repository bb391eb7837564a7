//! Domain types.

pub mod account;
mod audit;
mod batch;
mod integrity;

pub use account::{validate_env_key, Account, AccountBuilder, AccountType, Tokens};
pub use audit::{AuditEvent, AuditKind};
pub use batch::BatchSummary;
pub use integrity::IntegrityReport;
