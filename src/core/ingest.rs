//! Import from the older multi-account directory layout.
//!
//! Expected layout:
//!
//! ```text
//! <root>/accounts/<name>/account.json          metadata marker (required)
//! <root>/accounts/<name>/backups/*auth.json    credential snapshots, latest wins
//! <root>/accounts/<name>/auth.json             used when there are no snapshots
//! ```
//!
//! The ingestor only reads. Persisting what it yields is the caller's job.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::constants::{ACCOUNTS_DIR, LEGACY_FILE};
use crate::core::domain::Account;
use crate::core::legacy::{api_key_field, nested_tokens};
use crate::error::{LegacyError, Result};

const METADATA_FILE: &str = "account.json";
const BACKUPS_DIR: &str = "backups";

/// Scanner for legacy account trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyIngestor;

impl LegacyIngestor {
    pub fn new() -> Self {
        Self
    }

    /// Start a lazy scan of `path`.
    ///
    /// Each call re-reads the filesystem, so a scan can be restarted by
    /// calling this again.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::SourceMissing` if `path` does not exist and
    /// `LegacyError::NotLegacyLayout` if it has no `accounts/` directory.
    pub fn scan(&self, path: &Path) -> Result<LegacyScan> {
        if !path.exists() {
            return Err(LegacyError::SourceMissing(path.to_path_buf()).into());
        }
        let accounts_dir = path.join(ACCOUNTS_DIR);
        if !accounts_dir.is_dir() {
            return Err(LegacyError::NotLegacyLayout(path.to_path_buf()).into());
        }

        debug!(path = %accounts_dir.display(), "scanning legacy accounts");
        Ok(LegacyScan {
            entries: fs::read_dir(&accounts_dir)?,
        })
    }
}

/// Lazy sequence of importable accounts. Unusable directories are skipped.
#[derive(Debug)]
pub struct LegacyScan {
    entries: ReadDir,
}

impl Iterator for LegacyScan {
    type Item = Account;

    fn next(&mut self) -> Option<Account> {
        for entry in self.entries.by_ref() {
            let Ok(entry) = entry else { continue };
            let dir = entry.path();
            if !dir.is_dir() || !dir.join(METADATA_FILE).exists() {
                continue;
            }
            if let Some(account) = read_account(&dir) {
                return Some(account);
            }
        }
        None
    }
}

fn read_account(dir: &Path) -> Option<Account> {
    let name = dir.file_name()?.to_str()?.to_string();
    let auth_file = credential_file(dir)?;

    let data = match fs::read_to_string(&auth_file)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()))
    {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(path = %auth_file.display(), "skipping non-object credential file");
            return None;
        }
        Err(e) => {
            warn!(path = %auth_file.display(), error = %e, "skipping unreadable credential file");
            return None;
        }
    };

    let api_key = api_key_field(&data);
    let tokens = nested_tokens(&data);
    if api_key.is_none() && tokens.is_none() {
        debug!(account = %name, "no credentials, skipping");
        return None;
    }

    let mut builder = Account::builder(name);
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(tokens) = tokens {
        builder = builder.tokens(tokens);
    }
    if let Some(email) = data.get("email").and_then(Value::as_str) {
        builder = builder.email(email);
    }
    builder.build().ok()
}

/// Latest `backups/*auth.json` by name, else `auth.json`.
fn credential_file(dir: &Path) -> Option<PathBuf> {
    let backups = dir.join(BACKUPS_DIR);
    if let Ok(entries) = fs::read_dir(&backups) {
        let latest = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(LEGACY_FILE))
            })
            .max();
        if latest.is_some() {
            return latest;
        }
    }

    let direct = dir.join(LEGACY_FILE);
    direct.is_file().then_some(direct)
}
