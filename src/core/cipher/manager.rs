//! Key lifecycle for one vault.
//!
//! Key resolution order:
//!
//! 1. Key passed at construction
//! 2. `CODEX_MASTER_KEY` (primary vault only)
//! 3. OS secret store
//! 4. Key file on disk
//!
//! `ensure_key` generates and persists a key when nothing resolves;
//! `load_key` never does. Decryption therefore never creates a key.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::SecretKey;
use crate::core::atomic;
use crate::core::constants::{ENV_MASTER_KEY, KEYRING_MASTER_USER, KEYRING_SERVICE};
use crate::core::store::{Disabled, SecretStore};
use crate::error::{CipherError, Result};

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Explicit,
    Environment,
    Store,
    File,
    Generated,
}

/// Owns a single vault key and encrypts/decrypts payloads with it.
pub struct EncryptionManager {
    key: Option<SecretKey>,
    source: Option<KeySource>,
    explicit: Option<Zeroizing<String>>,
    key_path: Option<PathBuf>,
    store: Arc<dyn SecretStore>,
    store_user: String,
    env_override: bool,
}

impl EncryptionManager {
    /// Manager for the personal vault: honors `CODEX_MASTER_KEY` and the
    /// `master-key` secret store entry.
    pub fn primary(key_path: impl Into<PathBuf>, store: Arc<dyn SecretStore>) -> Self {
        Self {
            key: None,
            source: None,
            explicit: None,
            key_path: Some(key_path.into()),
            store,
            store_user: KEYRING_MASTER_USER.to_string(),
            env_override: true,
        }
    }

    /// Manager for a team vault.
    ///
    /// `key` is the shared team key recovered from the global config. When
    /// absent the vault resolves (or generates) its own key under
    /// `team-<slug>` and `key_path`.
    pub fn team(
        slug: &str,
        key_path: impl Into<PathBuf>,
        store: Arc<dyn SecretStore>,
        key: Option<Zeroizing<String>>,
    ) -> Self {
        Self {
            key: None,
            source: None,
            explicit: key,
            key_path: Some(key_path.into()),
            store,
            store_user: format!("team-{}", slug),
            env_override: false,
        }
    }

    /// Manager over a fixed key; never touches the store or disk.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if `key` is not a valid key string.
    pub fn with_key(key: &str) -> Result<Self> {
        let parsed = SecretKey::parse(key)?;
        Ok(Self {
            key: Some(parsed),
            source: Some(KeySource::Explicit),
            explicit: Some(Zeroizing::new(key.trim().to_string())),
            key_path: None,
            store: Arc::new(Disabled),
            store_user: String::new(),
            env_override: false,
        })
    }

    /// Generate a fresh key string, e.g. for a new team vault.
    pub fn generate_key() -> Zeroizing<String> {
        SecretKey::generate().expose()
    }

    /// Whether a key is currently loaded.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Where the loaded key came from.
    pub fn source(&self) -> Option<KeySource> {
        self.source
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    /// Load the key, generating and persisting a new one when none resolves.
    ///
    /// A generated key is written to the secret store (failures ignored) and
    /// to the key file with mode 0600.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` when a configured key is malformed,
    /// or an I/O error if the key file cannot be written.
    pub fn ensure_key(&mut self) -> Result<Zeroizing<String>> {
        if self.key.is_none() {
            self.load_key()?;
        }
        if let Some(key) = &self.key {
            return Ok(key.expose());
        }

        let key = SecretKey::generate();
        let secret = key.expose();

        if let Err(e) = self.store.set(KEYRING_SERVICE, &self.store_user, &secret) {
            debug!(user = %self.store_user, error = %e, "could not save key to secret store");
        }

        match &self.key_path {
            Some(path) => {
                atomic::write(path, secret.as_bytes())?;
                info!(path = %path.display(), "generated new encryption key");
            }
            None => return Err(CipherError::EncryptionUnavailable.into()),
        }

        self.key = Some(key);
        self.source = Some(KeySource::Generated);
        Ok(secret)
    }

    /// Resolve the key without generating one.
    ///
    /// Returns whether a key is loaded afterwards. A key found only in the
    /// key file is copied into the secret store when the store is reachable
    /// but empty.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` when a configured key is malformed.
    pub fn load_key(&mut self) -> Result<bool> {
        if self.key.is_some() {
            return Ok(true);
        }

        if let Some(explicit) = &self.explicit {
            self.set_key(SecretKey::parse(explicit)?, KeySource::Explicit);
            return Ok(true);
        }

        if self.env_override {
            if let Some(env_key) = std::env::var(ENV_MASTER_KEY)
                .ok()
                .filter(|v| !v.trim().is_empty())
            {
                let env_key = Zeroizing::new(env_key);
                self.set_key(SecretKey::parse(&env_key)?, KeySource::Environment);
                return Ok(true);
            }
        }

        let store_empty = match self.store.get(KEYRING_SERVICE, &self.store_user) {
            Ok(Some(stored)) => {
                let stored = Zeroizing::new(stored);
                match SecretKey::parse(&stored) {
                    Ok(key) => {
                        self.set_key(key, KeySource::Store);
                        return Ok(true);
                    }
                    Err(e) => {
                        warn!(user = %self.store_user, error = %e, "ignoring malformed key in secret store");
                        false
                    }
                }
            }
            Ok(None) => true,
            Err(e) => {
                debug!(store = self.store.name(), error = %e, "secret store unavailable");
                false
            }
        };

        let Some(path) = self.key_path.clone() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        let contents = Zeroizing::new(fs::read_to_string(&path)?);
        if contents.trim().is_empty() {
            return Ok(false);
        }
        let key = SecretKey::parse(&contents)?;
        debug!(path = %path.display(), "loaded key from file");

        if store_empty {
            match self
                .store
                .set(KEYRING_SERVICE, &self.store_user, contents.trim())
            {
                Ok(()) => info!(user = %self.store_user, "migrated key file into secret store"),
                Err(e) => debug!(error = %e, "key migration to secret store failed"),
            }
        }

        self.set_key(key, KeySource::File);
        Ok(true)
    }

    /// Encrypt `plaintext`, generating a key first if none is loaded.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionUnavailable` if no key can be obtained.
    pub fn encrypt(&mut self, plaintext: &str) -> Result<Vec<u8>> {
        if self.key.is_none() {
            self.ensure_key()?;
        }
        let key = self
            .key
            .as_ref()
            .ok_or(CipherError::EncryptionUnavailable)?;
        key.encrypt(plaintext.as_bytes())
    }

    /// Decrypt `ciphertext`. Never generates a key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionUnavailable` if no key resolves and
    /// `CipherError::DecryptionFailed` for a wrong key or corrupt input.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<String> {
        if self.key.is_none() {
            self.load_key()?;
        }
        let key = self
            .key
            .as_ref()
            .ok_or(CipherError::DecryptionUnavailable)?;
        let plaintext = key.decrypt(ciphertext)?;
        String::from_utf8(plaintext.to_vec())
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid UTF-8: {}", e)).into())
    }

    fn set_key(&mut self, key: SecretKey, source: KeySource) {
        debug!(user = %self.store_user, ?source, "encryption key loaded");
        self.key = Some(key);
        self.source = Some(source);
    }
}

impl fmt::Debug for EncryptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionManager")
            .field("loaded", &self.key.is_some())
            .field("source", &self.source)
            .field("key_path", &self.key_path)
            .field("store", &self.store.name())
            .field("store_user", &self.store_user)
            .finish()
    }
}
