//! codex-accounts - an encrypted local vault for Codex credentials.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── account       # init, add, save, list, rm, encrypt-all
//! │   ├── context       # switch, status
//! │   ├── env           # per-account environment variables
//! │   ├── run           # run with injected credentials
//! │   ├── team/         # team vault mounting
//! │   ├── audit         # audit log viewer
//! │   └── migrate       # import from the older layout
//! └── core/             # Core library components
//!     ├── manager/      # ConfigManager: routing across vaults
//!     ├── vault/        # Encrypted account CRUD for one directory
//!     ├── cipher/       # age-based key management
//!     ├── store/        # OS keyring and in-memory secret stores
//!     ├── config        # config.json
//!     ├── legacy        # legacy auth file projection and sessions
//!     ├── ingest        # legacy layout scanner
//!     ├── audit         # append-only JSONL audit log
//!     ├── env           # subprocess environment injection
//!     └── atomic        # crash-safe file writes
//! ```
//!
//! # Example
//!
//! ```no_run
//! use codex_accounts::core::domain::Account;
//! use codex_accounts::core::manager::ConfigManager;
//!
//! # fn main() -> codex_accounts::error::Result<()> {
//! let mut manager = ConfigManager::open("/tmp/codex-accounts")?;
//! let mut account = Account::builder("work").api_key("sk-...").build()?;
//! manager.save_account(&mut account)?;
//! manager.switch_account("work")?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::domain::{Account, AccountType};
pub use crate::core::manager::ConfigManager;
pub use crate::error::{Error, Result};
