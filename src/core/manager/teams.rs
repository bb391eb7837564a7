//! Team vault mounting.
//!
//! A team vault is keyed by a shared key distributed out of band. Locally the
//! key is stored in `team_keys`, encrypted under the primary key and hex
//! encoded.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{parse_reference, ConfigManager};
use crate::core::audit::details;
use crate::core::cipher::{EncryptionManager, SecretKey};
use crate::core::constants::{KEYRING_SERVICE, KEY_FILE, PERSONAL_VAULT, TEAMS_DIR};
use crate::core::domain::AuditKind;
use crate::core::slug::slugify;
use crate::core::vault::Vault;
use crate::error::{Result, ValidationError, VaultError};

impl ConfigManager {
    /// Create a new team vault with a fresh key and mount it.
    ///
    /// `path` defaults to `<root>/teams/<slug>`. Returns the key so it can be
    /// shared with the rest of the team.
    ///
    /// # Errors
    ///
    /// See [`ConfigManager::mount_team`].
    pub fn create_team(&mut self, name: &str, path: Option<PathBuf>) -> Result<Zeroizing<String>> {
        let slug = slugify(name);
        let path = path.unwrap_or_else(|| self.root.join(TEAMS_DIR).join(&slug));
        let key = EncryptionManager::generate_key();
        self.mount_team(name, &path, &key)?;
        Ok(key)
    }

    /// Register an existing team vault directory under `name`.
    ///
    /// Returns the team slug.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Reserved` for `personal`,
    /// `VaultError::AlreadyMounted` for a duplicate, `ValidationError` for an
    /// empty name and `CipherError::InvalidKey` for a malformed key.
    pub fn mount_team(&mut self, name: &str, path: &Path, key: &str) -> Result<String> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ValidationError::EmptyName(name.to_string()).into());
        }
        if slug == PERSONAL_VAULT {
            return Err(VaultError::Reserved(slug).into());
        }

        let mut config = self.persisted();
        if config.mounts.contains_key(&slug) || self.teams.contains_key(&slug) {
            return Err(VaultError::AlreadyMounted(slug).into());
        }

        SecretKey::parse(key)?;
        let encrypted = self.personal.cipher_mut().encrypt(key.trim())?;

        let path = if path.is_relative() {
            std::env::current_dir()?.join(path)
        } else {
            path.to_path_buf()
        };

        config.mounts.insert(slug.clone(), path.clone());
        config.team_keys.insert(slug.clone(), hex::encode(encrypted));
        self.save_config(config)?;
        self.mount_vault(&slug, &path)?;

        info!(team = %slug, path = %path.display(), "mounted team vault");
        Ok(slug)
    }

    /// Forget a team vault. Its files are left on disk.
    ///
    /// Clears the active account if it pointed into the team.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if the team is not mounted.
    pub fn unmount_team(&mut self, name: &str) -> Result<()> {
        let slug = slugify(name);
        let mut config = self.persisted();
        if !config.mounts.contains_key(&slug) && !self.teams.contains_key(&slug) {
            return Err(VaultError::NotFound(slug).into());
        }

        config.mounts.remove(&slug);
        config.team_keys.remove(&slug);
        let active_in_team = config
            .active_account
            .as_deref()
            .is_some_and(|active| parse_reference(active).0 == slug);
        if active_in_team {
            config.active_account = None;
        }
        self.save_config(config)?;
        self.teams.remove(&slug);

        if let Err(e) = self
            .store
            .delete(KEYRING_SERVICE, &format!("team-{}", slug))
        {
            debug!(team = %slug, error = %e, "could not remove cached team key");
        }

        info!(team = %slug, "unmounted team vault");
        Ok(())
    }

    /// Recover a team's shared key for handing to a teammate.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` for an unknown team and
    /// `VaultError::MissingTeamKey` if the stored key cannot be decrypted.
    pub fn team_key(&mut self, name: &str) -> Result<Zeroizing<String>> {
        let slug = slugify(name);
        if !self.teams.contains_key(&slug) {
            return Err(VaultError::NotFound(slug).into());
        }
        self.decrypt_team_key(&slug)
            .ok_or_else(|| VaultError::MissingTeamKey(slug).into())
    }

    /// Mounted team vaults and their roots, sorted by slug.
    pub fn mounts(&self) -> Vec<(String, PathBuf)> {
        self.teams
            .iter()
            .map(|(slug, vault)| (slug.clone(), vault.root().to_path_buf()))
            .collect()
    }

    /// Open the vault at `path` as team `slug`.
    ///
    /// A missing or undecryptable `team_keys` entry is audited and the vault
    /// is opened without a shared key.
    pub(super) fn mount_vault(&mut self, slug: &str, path: &Path) -> Result<()> {
        let has_entry = self.config.team_keys.contains_key(slug);
        let key = self.decrypt_team_key(slug);
        if has_entry && key.is_none() {
            warn!(team = %slug, "team key could not be decrypted, vault keyed independently");
            self.audit.log_event(
                AuditKind::Error,
                &format!("system/{}", slug),
                Some(details([("msg", "failed to decrypt team key")])),
                false,
            );
        }

        let cipher = EncryptionManager::team(slug, path.join(KEY_FILE), self.store.clone(), key);
        let vault = Vault::open(path, cipher, self.audit.clone(), Some(slug))?;
        self.teams.insert(slug.to_string(), vault);
        Ok(())
    }

    fn decrypt_team_key(&mut self, slug: &str) -> Option<Zeroizing<String>> {
        let encoded = self.config.team_keys.get(slug)?.clone();
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| warn!(team = %slug, error = %e, "team key is not valid hex"))
            .ok()?;
        self.personal
            .cipher_mut()
            .decrypt(&bytes)
            .map(Zeroizing::new)
            .map_err(|e| warn!(team = %slug, error = %e, "team key failed to decrypt"))
            .ok()
    }
}
