//! Account routing, switching and legacy projection.

use std::collections::BTreeMap;

use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{canonical_reference, parse_reference, ConfigManager};
use crate::core::domain::{Account, IntegrityReport};
use crate::core::env;
use crate::core::legacy::{self, SessionPolicy};
use crate::core::slug::slugify;
use crate::core::vault::Access;
use crate::error::{ConfigError, Result};

impl ConfigManager {
    /// Accounts from every vault, sorted by name.
    ///
    /// Personal accounts keep their bare name; team accounts are renamed to
    /// `team/name`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a vault's `accounts/` directory is unreadable.
    pub fn list_accounts(&mut self) -> Result<Vec<Account>> {
        let mut all = self.personal.list()?;

        for (slug, vault) in self.teams.iter_mut() {
            for mut account in vault.list()? {
                let qualified = canonical_reference(slug, account.name());
                account.set_name(qualified);
                all.push(account);
            }
        }

        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    /// Resolve and load one account. The returned name is vault-local.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` for an unknown vault, otherwise the
    /// vault's `AccountError`.
    pub fn get_account(&mut self, reference: &str, access: Access) -> Result<Account> {
        let (vault, name) = parse_reference(reference);
        self.vault_mut(&vault)?.get(&name, access)
    }

    /// Save an account into the vault its name addresses.
    ///
    /// The namespace prefix is stripped, so afterwards `account.name()` is
    /// the vault-local slug.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` for an unknown vault; storage errors
    /// propagate.
    pub fn save_account(&mut self, account: &mut Account) -> Result<()> {
        let (vault, name) = parse_reference(account.name());
        let target = self.vault_mut(&vault)?;
        account.set_name(name);
        target.save(account)
    }

    /// Remove an account, clearing the active pointer if it named it.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` or `AccountError::NotFound`.
    pub fn remove_account(&mut self, reference: &str) -> Result<()> {
        let (vault, name) = parse_reference(reference);
        self.vault_mut(&vault)?.remove(&name)?;

        let mut config = self.persisted();
        let was_active = config.active_account.as_deref().is_some_and(|active| {
            let (active_vault, active_name) = parse_reference(active);
            active_vault == vault && slugify(&active_name) == slugify(&name)
        });
        if was_active {
            config.active_account = None;
            self.save_config(config)?;
            info!(account = %reference, "cleared active account");
        }
        Ok(())
    }

    /// Make `reference` the active account.
    ///
    /// The account must exist. Its credentials are projected into the legacy
    /// auth file, live sessions are cleared or shelved per the session
    /// policy, and the canonical reference is persisted. Returns the
    /// canonical reference.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound`/`AccountError::NotFound` if the target
    /// does not resolve; legacy file and config write failures propagate.
    pub fn switch_account(&mut self, reference: &str) -> Result<String> {
        let (vault, name) = parse_reference(reference);
        let account = self.vault_mut(&vault)?.get(&name, Access::Decrypted)?;
        let canonical = canonical_reference(&vault, account.name());

        let mut config = self.persisted();
        match self.session_policy {
            SessionPolicy::Clear => self.sync_legacy_auth(&account)?,
            SessionPolicy::Shelve => {
                let previous = config.active_account.clone();
                let legacy = self.legacy();
                if previous.as_deref() == Some(canonical.as_str()) {
                    legacy.write(&account)?;
                } else {
                    if let Some(previous) = previous {
                        legacy.shelve_sessions(&self.shelf_dir(&previous))?;
                    }
                    legacy.write(&account)?;
                    legacy.restore_sessions(&self.shelf_dir(&canonical))?;
                }
            }
        }

        config.active_account = Some(canonical.clone());
        self.save_config(config)?;
        info!(account = %canonical, "switched active account");
        Ok(canonical)
    }

    /// Write `account` into the legacy auth file.
    ///
    /// Under [`SessionPolicy::Clear`] the adjacent sessions directory is
    /// emptied as well.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file or sessions directory cannot be
    /// written.
    pub fn sync_legacy_auth(&self, account: &Account) -> Result<()> {
        let legacy = self.legacy();
        legacy.write(account)?;
        if self.session_policy == SessionPolicy::Clear {
            legacy.clear_sessions()?;
        }
        Ok(())
    }

    /// Health of the active account and its legacy projection.
    pub fn check_active_integrity(&mut self) -> IntegrityReport {
        let Some(active) = self.active_account() else {
            return IntegrityReport::default();
        };
        let legacy = self.legacy();

        match self.get_account(&active, Access::Decrypted) {
            Ok(account) => {
                let legacy_exists = legacy.exists();
                IntegrityReport {
                    exists: true,
                    synced: legacy_exists && legacy.is_synced(&account),
                    legacy_exists,
                }
            }
            Err(e) => {
                debug!(account = %active, error = %e, "active account does not resolve");
                IntegrityReport {
                    exists: false,
                    synced: false,
                    legacy_exists: legacy.exists(),
                }
            }
        }
    }

    /// The active reference and its decrypted account.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoActiveAccount` when nothing is active.
    pub fn get_active(&mut self) -> Result<(String, Account)> {
        let active = self
            .active_account()
            .ok_or(ConfigError::NoActiveAccount)?;
        let account = self.get_account(&active, Access::Decrypted)?;
        Ok((active, account))
    }

    /// Environment variables to inject for the active account.
    ///
    /// # Errors
    ///
    /// See [`ConfigManager::get_active`].
    pub fn active_environment(&mut self) -> Result<BTreeMap<String, Zeroizing<String>>> {
        let (_, account) = self.get_active()?;
        Ok(env::injection(&account))
    }

    /// Read the current legacy auth file into a new, unsaved account.
    ///
    /// # Errors
    ///
    /// Returns a `LegacyError` when the file is missing, corrupt or has no
    /// credentials.
    pub fn capture_legacy_auth(&self, name: &str) -> Result<Account> {
        legacy::capture(&self.legacy_auth_path(), name)
    }

    /// Whether `reference` resolves to a stored account.
    pub fn contains(&self, reference: &str) -> bool {
        let (vault, name) = parse_reference(reference);
        self.vault(&vault).is_ok_and(|v| v.contains(&name))
    }
}
