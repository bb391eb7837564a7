//! Account CRUD for a vault.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{Access, Vault};
use crate::core::atomic;
use crate::core::audit::details;
use crate::core::constants::{ENCRYPTED_FILE, LEGACY_FILE};
use crate::core::domain::{Account, AuditKind};
use crate::core::slug::slugify;
use crate::error::{AccountError, Result, ValidationError};

impl Vault {
    /// Every readable account, sorted by name.
    ///
    /// Subdirectories that are unreadable, corrupt, or fail to decrypt are
    /// skipped so that one bad account never breaks enumeration.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the `accounts/` directory itself exists
    /// but cannot be read.
    pub fn list(&mut self) -> Result<Vec<Account>> {
        let entries = match fs::read_dir(&self.accounts_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut accounts = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match self.read(&path) {
                Ok(Some((account, _))) => accounts.push(account),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable account");
                }
            }
        }

        accounts.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(accounts)
    }

    /// Slugs of every account directory holding a record, readable or not.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the `accounts/` directory cannot be read.
    pub fn slugs(&self) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = fs::read_dir(&self.accounts_dir)?
            .flatten()
            .filter(|e| {
                let dir = e.path();
                dir.join(ENCRYPTED_FILE).exists() || dir.join(LEGACY_FILE).exists()
            })
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        slugs.sort();
        Ok(slugs)
    }

    /// Load one account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` when neither `auth.enc` nor
    /// `auth.json` exists, and `AccountError::Corrupted` when the stored
    /// record cannot be read, decrypted, or parsed.
    pub fn get(&mut self, name: &str, access: Access) -> Result<Account> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AccountError::NotFound(name.to_string()).into());
        }
        let dir = self.account_dir(&slug);

        let (account, legacy) = match self.read(&dir) {
            Ok(Some(found)) => found,
            Ok(None) => return Err(AccountError::NotFound(name.to_string()).into()),
            Err(e) => {
                return Err(AccountError::Corrupted {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        if access == Access::Decrypted {
            self.audit.log_event(
                AuditKind::Access,
                &self.reference(&slug),
                Some(details([("decrypted", true), ("legacy", legacy)])),
                true,
            );
        }
        Ok(account)
    }

    /// Persist an account, replacing any previous version.
    ///
    /// The account's name is normalized to its slug in place. A plaintext
    /// `auth.json` left from an older version is deleted once the encrypted
    /// record is on disk.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyName` if the name normalizes to
    /// nothing. Encryption and I/O failures propagate.
    pub fn save(&mut self, account: &mut Account) -> Result<()> {
        let slug = slugify(account.name());
        if slug.is_empty() {
            return Err(ValidationError::EmptyName(account.name().to_string()).into());
        }
        if slug != account.name() {
            account.set_name(slug.clone());
        }

        let dir = self.account_dir(&slug);
        let json = Zeroizing::new(serde_json::to_string_pretty(account)?);
        let encrypted = self.cipher.encrypt(&json)?;
        atomic::write(&dir.join(ENCRYPTED_FILE), &encrypted)?;

        self.audit
            .log_event(AuditKind::Modify, &self.reference(&slug), None, true);

        let legacy = dir.join(LEGACY_FILE);
        if legacy.exists() {
            fs::remove_file(&legacy)?;
            info!(account = %slug, "migrated plaintext account to encrypted storage");
        }

        debug!(account = %slug, bytes = encrypted.len(), "saved account");
        Ok(())
    }

    /// Delete an account and everything under its directory.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account directory is absent.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let slug = slugify(name);
        let dir = self.account_dir(&slug);
        if slug.is_empty() || !dir.is_dir() {
            return Err(AccountError::NotFound(name.to_string()).into());
        }

        fs::remove_dir_all(&dir)?;
        self.audit
            .log_event(AuditKind::Delete, &self.reference(&slug), None, true);

        info!(account = %slug, "removed account");
        Ok(())
    }

    /// Read the record in `dir`: `auth.enc` first, then legacy `auth.json`.
    ///
    /// The directory name is authoritative for the account name.
    fn read(&mut self, dir: &Path) -> Result<Option<(Account, bool)>> {
        let encrypted = dir.join(ENCRYPTED_FILE);
        let legacy = dir.join(LEGACY_FILE);

        let (json, is_legacy) = if encrypted.exists() {
            let bytes = fs::read(&encrypted)?;
            (Zeroizing::new(self.cipher.decrypt(&bytes)?), false)
        } else if legacy.exists() {
            (Zeroizing::new(fs::read_to_string(&legacy)?), true)
        } else {
            return Ok(None);
        };

        let mut account: Account = serde_json::from_str(&json)?;
        if let Some(slug) = dir.file_name().and_then(|n| n.to_str()) {
            if account.name() != slug {
                account.set_name(slug);
            }
        }
        Ok(Some((account, is_legacy)))
    }
}
