//! Error types.
//!
//! Each concern owns a small error enum; `Error` aggregates them so callers
//! can propagate with `?` and the binary can match on the kind it cares about.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Legacy(#[from] LegacyError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

/// Account lookup and decoding failures.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("account '{0}' not found")]
    NotFound(String),

    #[error("account '{name}' is corrupted: {reason}")]
    Corrupted { name: String, reason: String },

    #[error("account '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(String),
}

/// Vault routing and mount failures.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("vault '{0}' not found")]
    NotFound(String),

    #[error("vault name '{0}' is reserved")]
    Reserved(String),

    #[error("team '{0}' is already mounted")]
    AlreadyMounted(String),

    #[error("team key for '{0}' is missing or unreadable")]
    MissingTeamKey(String),
}

/// Global configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("global configuration corrupted: {0}")]
    Corrupted(String),

    #[error("failed to read configuration: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to save configuration: {0}")]
    WriteFile(#[source] std::io::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no active account selected")]
    NoActiveAccount,

    #[error("unable to determine home directory")]
    NoHomeDir,
}

/// Key resolution and AEAD failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption key could not be loaded or generated")]
    EncryptionUnavailable,

    #[error("no encryption key found, cannot decrypt data")]
    DecryptionUnavailable,

    #[error("failed to decrypt data: invalid key or corrupted file ({0})")]
    DecryptionFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
}

/// OS secret store failures. Never fatal outside the store module.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("secret store access denied")]
    AccessDenied,

    #[error("secret store error: {0}")]
    Backend(String),
}

/// Input validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("account must have an api_key, tokens, or env_vars")]
    NoCredentials,

    #[error("account name '{0}' is empty after normalization")]
    EmptyName(String),

    #[error("invalid environment variable name '{key}': {reason}")]
    InvalidEnvVar { key: String, reason: String },

    #[error("invalid account type '{0}'")]
    InvalidType(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Legacy file and legacy layout failures.
#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("legacy auth file not found at {0}")]
    AuthFileMissing(PathBuf),

    #[error("legacy auth file at {path} is corrupted: {reason}")]
    AuthFileCorrupted { path: PathBuf, reason: String },

    #[error("no usable credentials found in {0}")]
    NoCredentials(PathBuf),

    #[error("migration source '{0}' does not exist")]
    SourceMissing(PathBuf),

    #[error("source '{0}' does not look like a legacy project (missing 'accounts/' dir)")]
    NotLegacyLayout(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
