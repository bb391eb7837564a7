//! A directory of encrypted accounts.
//!
//! Layout under the vault root:
//!
//! ```text
//! accounts/<slug>/auth.enc    encrypted account (current format)
//! accounts/<slug>/auth.json   plaintext account (legacy, removed on next save)
//! ```
//!
//! The personal vault and team vaults are the same type; they differ only in
//! the key their [`EncryptionManager`] resolves and in the namespace used for
//! audit references.

mod accounts;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::audit::AuditLog;
use crate::core::cipher::EncryptionManager;
use crate::core::constants::{ACCOUNTS_DIR, ENCRYPTED_FILE, LEGACY_FILE};
use crate::error::Result;

/// How much of an account a read needs.
///
/// `Decrypted` marks a read whose credentials will be used, and is recorded
/// in the audit log as an `access` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    #[default]
    Metadata,
    Decrypted,
}

/// Durable CRUD over one directory of encrypted accounts.
#[derive(Debug)]
pub struct Vault {
    root: PathBuf,
    accounts_dir: PathBuf,
    cipher: EncryptionManager,
    audit: AuditLog,
    namespace: Option<String>,
}

impl Vault {
    /// Open (creating if needed) the vault rooted at `root`.
    ///
    /// `namespace` is the team slug for mounted vaults and `None` for the
    /// personal vault.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the `accounts/` directory cannot be created.
    pub fn open(
        root: impl Into<PathBuf>,
        cipher: EncryptionManager,
        audit: AuditLog,
        namespace: Option<&str>,
    ) -> Result<Self> {
        let root = root.into();
        let accounts_dir = root.join(ACCOUNTS_DIR);
        fs::create_dir_all(&accounts_dir)?;
        debug!(root = %root.display(), namespace = ?namespace, "opened vault");

        Ok(Self {
            root,
            accounts_dir,
            cipher,
            audit,
            namespace: namespace.map(str::to_string),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn accounts_dir(&self) -> &Path {
        &self.accounts_dir
    }

    /// Team slug, `None` for the personal vault.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn cipher(&self) -> &EncryptionManager {
        &self.cipher
    }

    pub fn cipher_mut(&mut self) -> &mut EncryptionManager {
        &mut self.cipher
    }

    /// Whether an account with this (normalized) name is stored.
    pub fn contains(&self, name: &str) -> bool {
        let dir = self.account_dir(&crate::core::slug::slugify(name));
        dir.join(ENCRYPTED_FILE).exists() || dir.join(LEGACY_FILE).exists()
    }

    fn account_dir(&self, slug: &str) -> PathBuf {
        self.accounts_dir.join(slug)
    }

    /// Audit reference for an account slug, qualified for team vaults.
    fn reference(&self, slug: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, slug),
            None => slug.to_string(),
        }
    }
}
