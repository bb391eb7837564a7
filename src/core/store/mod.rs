//! Secret store abstraction.
//!
//! The primary key (and cached team keys) live in the OS secret store when
//! one is reachable. Every backend is best-effort from the caller's point of
//! view: the encryption layer treats any `Err` as "store unavailable" and
//! falls back to the key file.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module and teach `default_backend` about it

use crate::error::Result;

mod backend;
mod keyring;
mod memory;

pub use self::keyring::Keyring;
pub use backend::default_backend;
pub use memory::{Disabled, MemoryStore};

/// Key/value secret storage addressed by `(service, user)`.
pub trait SecretStore: Send + Sync {
    /// Read a secret.
    ///
    /// Returns `Ok(None)` when the store is reachable but holds no entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the store itself cannot be reached.
    fn get(&self, service: &str, user: &str) -> Result<Option<String>>;

    /// Create or replace a secret.
    fn set(&self, service: &str, user: &str, value: &str) -> Result<()>;

    /// Delete a secret. Deleting a missing entry succeeds.
    fn delete(&self, service: &str, user: &str) -> Result<()>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
