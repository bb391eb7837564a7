//! Backend selection for the secret store.

use std::sync::Arc;

use tracing::debug;

use super::{Disabled, Keyring, SecretStore};
use crate::core::constants::ENV_NO_KEYRING;

/// Default backend selection.
///
/// Uses the OS keyring unless `CODEX_NO_KEYRING` is set to a non-empty value
/// other than `0`, in which case keys live only in the key file.
pub fn default_backend() -> Arc<dyn SecretStore> {
    if keyring_disabled() {
        debug!("secret store disabled via {}", ENV_NO_KEYRING);
        Arc::new(Disabled)
    } else {
        debug!("using OS keyring backend");
        Arc::new(Keyring::new())
    }
}

fn keyring_disabled() -> bool {
    std::env::var(ENV_NO_KEYRING)
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}
