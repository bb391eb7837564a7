//! Global configuration.
//!
//! A single `config.json` per storage root holds the active account pointer,
//! the mounted team vaults and their encrypted keys. The value is owned by
//! [`ConfigManager`](crate::core::manager::ConfigManager); this module only
//! knows how to read, validate and write it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::core::atomic;
use crate::core::constants::{GITIGNORE_ENTRIES, PERSONAL_VAULT};
use crate::core::domain::account::parse_timestamp;
use crate::core::slug::slugify;
use crate::error::{ConfigError, Result};

/// Global state stored in `<root>/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active account reference: `slug` or `team/slug`.
    #[serde(default)]
    pub active_account: Option<String>,
    /// Mounted team vaults: slug -> vault root.
    #[serde(default)]
    pub mounts: BTreeMap<String, PathBuf>,
    /// Team keys encrypted under the primary key, hex encoded.
    #[serde(default)]
    pub team_keys: BTreeMap<String, String>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_account: None,
            mounts: BTreeMap::new(),
            team_keys: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}

impl Config {
    /// Load the configuration at `path`. A missing file is the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file exists but cannot be read
    /// and `ConfigError::Corrupted` if it does not parse or validate.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;

        debug!(
            mounts = config.mounts.len(),
            active = ?config.active_account,
            "config loaded"
        );
        Ok(config)
    }

    /// Write the configuration to `path` atomically with mode 0600.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WriteFile` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        atomic::write(path, contents.as_bytes()).map_err(ConfigError::WriteFile)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Corrupted` when a mount uses the reserved
    /// `personal` slug or a slug that is not normalized.
    pub fn validate(&self) -> Result<()> {
        for slug in self.mounts.keys() {
            if slug == PERSONAL_VAULT {
                return Err(ConfigError::Corrupted(format!(
                    "mount name '{}' is reserved",
                    PERSONAL_VAULT
                ))
                .into());
            }
            if slugify(slug) != *slug || slug.is_empty() {
                return Err(
                    ConfigError::Corrupted(format!("invalid mount name '{}'", slug)).into(),
                );
            }
        }
        Ok(())
    }
}

/// Ensure `<root>/.gitignore` carries the allowlist that keeps everything but
/// encrypted account files out of version control.
///
/// Missing entries are appended; existing lines are left alone.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or written.
pub fn ensure_gitignore(root: &Path) -> Result<()> {
    let gitignore = root.join(".gitignore");

    let existing = if gitignore.exists() {
        fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    let mut updated = existing.clone();
    for entry in GITIGNORE_ENTRIES {
        if !existing.lines().any(|l| l.trim() == *entry) {
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(entry);
            updated.push('\n');
        }
    }

    if updated != existing {
        atomic::write(&gitignore, updated.as_bytes())?;
    }
    Ok(())
}

fn timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
