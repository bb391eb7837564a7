//! OS secret store backend.
//!
//! Uses the `keyring` crate: Keychain on macOS, Credential Manager on
//! Windows, the kernel keyring on Linux.

use tracing::debug;

use super::SecretStore;
use crate::error::{Result, StoreError};

/// Secret store backed by the platform keychain.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keyring;

impl Keyring {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, user: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, user).map_err(map_error)
    }
}

impl SecretStore for Keyring {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>> {
        match Self::entry(service, user)?.get_password() {
            Ok(secret) => {
                debug!(service, user, "secret store hit");
                Ok(Some(secret))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(service, user, "secret store miss");
                Ok(None)
            }
            Err(e) => Err(map_error(e)),
        }
    }

    fn set(&self, service: &str, user: &str, value: &str) -> Result<()> {
        Self::entry(service, user)?
            .set_password(value)
            .map_err(map_error)?;
        debug!(service, user, "stored secret");
        Ok(())
    }

    fn delete(&self, service: &str, user: &str) -> Result<()> {
        match Self::entry(service, user)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_error(e)),
        }
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}

fn map_error(e: keyring::Error) -> crate::error::Error {
    match e {
        keyring::Error::NoStorageAccess(inner) => {
            debug!(error = %inner, "secret store refused access");
            StoreError::AccessDenied.into()
        }
        keyring::Error::PlatformFailure(inner) => {
            StoreError::Unavailable(inner.to_string()).into()
        }
        other => StoreError::Backend(other.to_string()).into(),
    }
}
