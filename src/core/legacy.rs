//! Legacy auth file projection.
//!
//! Other tooling reads credentials from a flat plaintext JSON file
//! (`~/.codex/auth.json` by default). Switching accounts rewrites that file
//! from the active account and resets the live `sessions/` directory next to
//! it, so session state from the previous account never leaks into the new
//! one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::atomic;
use crate::core::constants::{
    LEGACY_API_KEY, LEGACY_API_KEY_ALIAS, REFRESH_MARKER, SESSIONS_DIR,
};
use crate::core::domain::{Account, Tokens};
use crate::error::{LegacyError, Result};

/// Token fields recognized at the top level of a legacy file.
const FLAT_TOKEN_FIELDS: &[&str] = &["access_token", "refresh_token", "id_token", "expires_at"];

/// What happens to live sessions when the active account changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Delete live sessions and start empty.
    #[default]
    Clear,
    /// Move live sessions to the outgoing account's shelf and restore the
    /// incoming account's shelf.
    Shelve,
}

/// The legacy auth file and its adjacent sessions directory.
#[derive(Debug, Clone)]
pub struct LegacyAuth {
    path: PathBuf,
}

impl LegacyAuth {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// `sessions/` next to the auth file.
    pub fn sessions_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SESSIONS_DIR)
    }

    /// The flat mapping written for `account`.
    ///
    /// The api key appears under both `api_key` and `OPENAI_API_KEY`; tokens
    /// appear nested under `tokens` and flattened to the top level. The
    /// `last_refresh` marker is always stamped.
    pub fn payload(account: &Account) -> Map<String, Value> {
        let mut data = Map::new();

        if let Some(key) = account.api_key() {
            data.insert(LEGACY_API_KEY.into(), Value::from(key));
            data.insert(LEGACY_API_KEY_ALIAS.into(), Value::from(key));
        }
        if let Some(email) = account.email() {
            data.insert("email".into(), Value::from(email));
        }
        if let Some(tokens) = account.tokens() {
            let nested: Map<String, Value> = tokens
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            data.insert("tokens".into(), Value::Object(nested));
            for (k, v) in tokens {
                data.insert(k.clone(), v.clone());
            }
        }

        data.insert(
            REFRESH_MARKER.into(),
            Value::from(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        );
        data
    }

    /// Atomically write `account`'s credentials (mode 0600).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write(&self, account: &Account) -> Result<()> {
        let contents = serde_json::to_string_pretty(&Value::Object(Self::payload(account)))?;
        atomic::write(&self.path, contents.as_bytes())?;
        info!(path = %self.path.display(), account = %account.name(), "synced legacy auth file");
        Ok(())
    }

    /// Parse the legacy file as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::AuthFileMissing` or
    /// `LegacyError::AuthFileCorrupted`.
    pub fn read(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LegacyError::AuthFileMissing(self.path.clone()).into())
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(self.corrupted("expected a JSON object")),
            Err(e) => Err(self.corrupted(&e.to_string())),
        }
    }

    /// Whether the file currently carries `account`'s credentials.
    ///
    /// With an api key, the key must match; with tokens only, the token set
    /// must match (nested, or flattened when no nested copy exists); an
    /// account with only environment variables needs just the marker. The
    /// `last_refresh` marker is required in every case. Unreadable files are
    /// never in sync.
    pub fn is_synced(&self, account: &Account) -> bool {
        let Ok(data) = self.read() else {
            return false;
        };
        if !data.contains_key(REFRESH_MARKER) {
            return false;
        }

        if let Some(key) = account.api_key() {
            return api_key_field(&data).as_deref() == Some(key);
        }
        if let Some(tokens) = account.tokens() {
            let legacy = nested_tokens(&data).unwrap_or_else(|| {
                tokens
                    .keys()
                    .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
                    .collect()
            });
            return &legacy == tokens;
        }
        true
    }

    /// Delete and recreate an existing sessions directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be removed or recreated.
    pub fn clear_sessions(&self) -> Result<()> {
        let sessions = self.sessions_dir();
        if sessions.exists() {
            fs::remove_dir_all(&sessions)?;
            fs::create_dir_all(&sessions)?;
            debug!(path = %sessions.display(), "cleared sessions");
        }
        Ok(())
    }

    /// Move every live session entry into `shelf`, replacing what was there.
    ///
    /// Returns the number of entries shelved.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an entry cannot be moved.
    pub fn shelve_sessions(&self, shelf: &Path) -> Result<usize> {
        let sessions = self.sessions_dir();
        if !sessions.is_dir() {
            return Ok(0);
        }
        if shelf.exists() {
            fs::remove_dir_all(shelf)?;
        }
        fs::create_dir_all(shelf)?;

        let moved = move_entries(&sessions, shelf)?;
        debug!(count = moved, shelf = %shelf.display(), "shelved sessions");
        Ok(moved)
    }

    /// Replace live sessions with the contents of `shelf` and drop the shelf.
    ///
    /// Returns the number of entries restored. Live sessions are always left
    /// empty when there is nothing to restore.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an entry cannot be moved.
    pub fn restore_sessions(&self, shelf: &Path) -> Result<usize> {
        let sessions = self.sessions_dir();
        if sessions.exists() {
            fs::remove_dir_all(&sessions)?;
        }
        fs::create_dir_all(&sessions)?;

        if !shelf.is_dir() {
            return Ok(0);
        }
        let moved = move_entries(shelf, &sessions)?;
        fs::remove_dir_all(shelf)?;
        debug!(count = moved, shelf = %shelf.display(), "restored sessions");
        Ok(moved)
    }

    fn corrupted(&self, reason: &str) -> crate::error::Error {
        LegacyError::AuthFileCorrupted {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
        .into()
    }
}

/// Build an account named `name` from the legacy file at `path`.
///
/// Accepts `api_key` or `OPENAI_API_KEY`, and a nested `tokens` object or
/// flattened `access_token`/`refresh_token`/`id_token`/`expires_at` fields.
/// The account is tagged `imported`.
///
/// # Errors
///
/// Returns `LegacyError::AuthFileMissing`, `LegacyError::AuthFileCorrupted`
/// or `LegacyError::NoCredentials`.
pub fn capture(path: &Path, name: &str) -> Result<Account> {
    let data = LegacyAuth::new(path).read()?;

    let api_key = api_key_field(&data);
    let tokens = nested_tokens(&data).or_else(|| {
        if !data.contains_key("access_token") {
            return None;
        }
        Some(
            FLAT_TOKEN_FIELDS
                .iter()
                .filter_map(|k| {
                    data.get(*k)
                        .filter(|v| !v.is_null())
                        .map(|v| (k.to_string(), v.clone()))
                })
                .collect(),
        )
    });

    if api_key.is_none() && tokens.is_none() {
        return Err(LegacyError::NoCredentials(path.to_path_buf()).into());
    }

    let mut builder = Account::builder(name).tag("imported");
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(tokens) = tokens {
        builder = builder.tokens(tokens);
    }
    if let Some(email) = data.get("email").and_then(Value::as_str) {
        builder = builder.email(email);
    }

    builder
        .build()
        .map_err(|_| LegacyError::NoCredentials(path.to_path_buf()).into())
}

/// `api_key`, falling back to `OPENAI_API_KEY`; empty strings are absent.
pub(crate) fn api_key_field(data: &Map<String, Value>) -> Option<String> {
    [LEGACY_API_KEY, LEGACY_API_KEY_ALIAS]
        .iter()
        .filter_map(|k| data.get(*k).and_then(Value::as_str))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Non-empty nested `tokens` object.
pub(crate) fn nested_tokens(data: &Map<String, Value>) -> Option<Tokens> {
    match data.get("tokens") {
        Some(Value::Object(map)) if !map.is_empty() => {
            Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
        _ => None,
    }
}

fn move_entries(from: &Path, to: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        move_path(&entry.path(), &target)?;
        count += 1;
    }
    Ok(count)
}

/// Rename, falling back to copy + delete across filesystems.
fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    if from.is_dir() {
        copy_dir(from, to)?;
        fs::remove_dir_all(from)
    } else {
        fs::copy(from, to)?;
        fs::remove_file(from)
    }
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
