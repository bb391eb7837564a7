//! Constants used throughout codex-accounts.
//!
//! Centralizes file names, environment variables and secret store identifiers.

/// Storage root directory relative to HOME (`~/.codex-accounts`).
pub const ROOT_DIR: &str = ".codex-accounts";

/// Global configuration file inside the storage root.
pub const CONFIG_FILE: &str = "config.json";

/// Fallback primary key file inside the storage root (and team vault roots).
pub const KEY_FILE: &str = "master.key";

/// Append-only audit log inside the storage root.
pub const AUDIT_FILE: &str = "audit.log";

/// Per-vault directory holding one subdirectory per account.
pub const ACCOUNTS_DIR: &str = "accounts";

/// Encrypted account record (current format).
pub const ENCRYPTED_FILE: &str = "auth.enc";

/// Plaintext account record (legacy format, migrated on next save).
pub const LEGACY_FILE: &str = "auth.json";

/// Directory holding cloned team vaults.
pub const TEAMS_DIR: &str = "teams";

/// Directory where live sessions are shelved per account.
pub const SHELF_DIR: &str = "shelved_sessions";

/// Live session directory next to the legacy auth file.
pub const SESSIONS_DIR: &str = "sessions";

/// Reserved slug of the primary vault.
pub const PERSONAL_VAULT: &str = "personal";

/// Legacy auth file relative to HOME (`~/.codex/auth.json`).
pub const LEGACY_AUTH_DIR: &str = ".codex";

/// Field stamped into the legacy auth file on every projection.
pub const REFRESH_MARKER: &str = "last_refresh";

/// Primary api key field of the legacy auth file.
pub const LEGACY_API_KEY: &str = "api_key";

/// Compatibility alias for the api key in the legacy auth file.
pub const LEGACY_API_KEY_ALIAS: &str = "OPENAI_API_KEY";

/// Gitignore allowlist written into the storage root.
///
/// Denies everything except the encrypted account records.
pub const GITIGNORE_ENTRIES: &[&str] = &[
    "*",
    "!.gitignore",
    "!accounts/",
    "!accounts/*/",
    "!accounts/*/auth.enc",
];

/// Secret store service name.
pub const KEYRING_SERVICE: &str = "codex-account-manager";

/// Secret store user holding the primary key.
pub const KEYRING_MASTER_USER: &str = "master-key";

/// Environment variable overriding the storage root.
pub const ENV_HOME: &str = "CODEX_ACCOUNTS_HOME";

/// Environment variable overriding the primary key.
pub const ENV_MASTER_KEY: &str = "CODEX_MASTER_KEY";

/// Environment variable overriding the legacy auth file path.
pub const ENV_LEGACY_AUTH_FILE: &str = "CODEX_LEGACY_AUTH_FILE";

/// Environment variable overriding the active account for one session.
pub const ENV_ACTIVE_ACCOUNT: &str = "CODEX_ACTIVE_ACCOUNT";

/// Environment variable disabling the OS secret store.
pub const ENV_NO_KEYRING: &str = "CODEX_NO_KEYRING";

/// Injected into subprocesses when the account has an api key.
pub const INJECT_API_KEY: &str = "CODEX_API_KEY";

/// Injected into subprocesses when the account has an access token.
pub const INJECT_ACCESS_TOKEN: &str = "CODEX_ACCESS_TOKEN";
