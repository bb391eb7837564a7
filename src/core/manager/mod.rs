//! Top-level orchestration over every vault.
//!
//! [`ConfigManager`] owns the storage root: the personal vault, any mounted
//! team vaults, the global [`Config`], the audit log and the legacy auth file
//! projection. Account references are routed by namespace:
//!
//! - `name` addresses the personal vault
//! - `team/name` addresses the team vault mounted as `team`

mod accounts;
mod batch;
mod teams;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::audit::{details, AuditLog};
use crate::core::cipher::EncryptionManager;
use crate::core::config::{self, Config};
use crate::core::constants::{
    CONFIG_FILE, ENV_ACTIVE_ACCOUNT, ENV_HOME, ENV_LEGACY_AUTH_FILE, KEY_FILE, LEGACY_AUTH_DIR,
    LEGACY_FILE, PERSONAL_VAULT, ROOT_DIR, SHELF_DIR,
};
use crate::core::domain::AuditKind;
use crate::core::legacy::{LegacyAuth, SessionPolicy};
use crate::core::slug::slugify;
use crate::core::store::{default_backend, SecretStore};
use crate::core::vault::Vault;
use crate::error::{ConfigError, Result, VaultError};

/// Construction options for [`ConfigManager::open_with`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Secret store for key material. Defaults to [`default_backend`].
    pub store: Option<Arc<dyn SecretStore>>,
    /// Legacy auth file location, taking precedence over every other source.
    pub legacy_auth_path: Option<PathBuf>,
    pub session_policy: SessionPolicy,
}

/// Owner of the storage root and every vault in it.
#[derive(Debug)]
pub struct ConfigManager {
    root: PathBuf,
    config_file: PathBuf,
    config: Config,
    audit: AuditLog,
    store: Arc<dyn SecretStore>,
    personal: Vault,
    teams: BTreeMap<String, Vault>,
    legacy_auth_path: Option<PathBuf>,
    session_policy: SessionPolicy,
}

/// Default storage root: `CODEX_ACCOUNTS_HOME`, else `~/.codex-accounts`.
///
/// # Errors
///
/// Returns `ConfigError::NoHomeDir` when no home directory can be found.
pub fn default_root() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(ENV_HOME).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|h| h.join(ROOT_DIR))
        .ok_or_else(|| ConfigError::NoHomeDir.into())
}

/// Split a reference into `(vault, account)`. Bare names live in `personal`.
pub fn parse_reference(reference: &str) -> (String, String) {
    match reference.split_once('/') {
        Some((vault, account)) => (slugify(vault), account.to_string()),
        None => (PERSONAL_VAULT.to_string(), reference.to_string()),
    }
}

/// Canonical reference: the bare slug for `personal`, `vault/slug` otherwise.
pub fn canonical_reference(vault: &str, account_slug: &str) -> String {
    if vault == PERSONAL_VAULT {
        account_slug.to_string()
    } else {
        format!("{}/{}", vault, account_slug)
    }
}

impl ConfigManager {
    /// Open the storage root with default options.
    ///
    /// # Errors
    ///
    /// See [`ConfigManager::open_with`].
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(root, Options::default())
    }

    /// Open (creating if needed) the storage root.
    ///
    /// Creates the root and its `.gitignore`, makes sure the primary key
    /// exists, loads the global config (a corrupt file is replaced by an
    /// empty default in memory and left untouched on disk), and mounts every
    /// configured team vault. A team vault whose key cannot be recovered is
    /// still mounted, keyed independently, and the failure is audited.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or the primary key
    /// cannot be loaded or generated.
    pub fn open_with(root: impl Into<PathBuf>, options: Options) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        config::ensure_gitignore(&root)?;

        let audit = AuditLog::new(&root);
        let store = options.store.unwrap_or_else(default_backend);

        let mut cipher = EncryptionManager::primary(root.join(KEY_FILE), store.clone());
        cipher.ensure_key()?;

        let config_file = root.join(CONFIG_FILE);
        let config = Config::load(&config_file).unwrap_or_else(|e| {
            warn!(path = %config_file.display(), error = %e, "ignoring unreadable config");
            Config::default()
        });

        let personal = Vault::open(&root, cipher, audit.clone(), None)?;

        let mut manager = Self {
            root,
            config_file,
            config,
            audit,
            store,
            personal,
            teams: BTreeMap::new(),
            legacy_auth_path: options.legacy_auth_path,
            session_policy: options.session_policy,
        };

        let mounts: Vec<(String, PathBuf)> = manager
            .config
            .mounts
            .iter()
            .map(|(slug, path)| (slug.clone(), path.clone()))
            .collect();
        for (slug, path) in mounts {
            if let Err(e) = manager.mount_vault(&slug, &path) {
                warn!(team = %slug, error = %e, "failed to mount team vault");
                manager.audit.log_event(
                    AuditKind::Error,
                    &format!("system/{}", slug),
                    Some(details([("msg", format!("failed to mount vault: {}", e))])),
                    false,
                );
            }
        }

        debug!(
            root = %manager.root.display(),
            teams = manager.teams.len(),
            "config manager ready"
        );
        Ok(manager)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Name of the secret store backend in use.
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn session_policy(&self) -> SessionPolicy {
        self.session_policy
    }

    /// The persisted config as last loaded or saved, without overrides.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Re-read the config from disk and apply `CODEX_ACTIVE_ACCOUNT`.
    ///
    /// The in-memory copy is refreshed with the persisted value; the
    /// environment override is applied to the returned value only.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Corrupted` if the file does not parse.
    pub fn load_config(&mut self) -> Result<Config> {
        let config = Config::load(&self.config_file)?;
        self.config = config.clone();
        Ok(apply_env_override(config))
    }

    /// Persist `config` and make it the in-memory value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WriteFile` if the file cannot be written.
    pub fn save_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        config.save(&self.config_file)?;
        self.config = config;
        Ok(())
    }

    /// Persisted config for read-modify-write; a corrupt file yields the
    /// default so the next save replaces it.
    fn persisted(&mut self) -> Config {
        match Config::load(&self.config_file) {
            Ok(config) => {
                self.config = config.clone();
                config
            }
            Err(e) => {
                warn!(error = %e, "config unreadable, starting from defaults");
                Config::default()
            }
        }
    }

    /// Active account reference, honoring `CODEX_ACTIVE_ACCOUNT`.
    pub fn active_account(&mut self) -> Option<String> {
        apply_env_override(self.persisted()).active_account
    }

    /// `personal` followed by every mounted team slug.
    pub fn vault_slugs(&self) -> Vec<String> {
        std::iter::once(PERSONAL_VAULT.to_string())
            .chain(self.teams.keys().cloned())
            .collect()
    }

    pub fn vault(&self, slug: &str) -> Result<&Vault> {
        if slug == PERSONAL_VAULT {
            return Ok(&self.personal);
        }
        self.teams
            .get(slug)
            .ok_or_else(|| VaultError::NotFound(slug.to_string()).into())
    }

    pub fn vault_mut(&mut self, slug: &str) -> Result<&mut Vault> {
        if slug == PERSONAL_VAULT {
            return Ok(&mut self.personal);
        }
        self.teams
            .get_mut(slug)
            .ok_or_else(|| VaultError::NotFound(slug.to_string()).into())
    }

    /// Location of the legacy auth file.
    ///
    /// Precedence: the path given in [`Options`], `CODEX_LEGACY_AUTH_FILE`,
    /// `<root>/.codex/auth.json` when the root is not the default
    /// `~/.codex-accounts`, and finally `~/.codex/auth.json`.
    pub fn legacy_auth_path(&self) -> PathBuf {
        if let Some(path) = &self.legacy_auth_path {
            return path.clone();
        }
        if let Some(path) = std::env::var(ENV_LEGACY_AUTH_FILE)
            .ok()
            .filter(|v| !v.is_empty())
        {
            return expand_home(&path);
        }

        let home = dirs::home_dir();
        let default_root = home.as_ref().map(|h| h.join(ROOT_DIR));
        match (home, default_root) {
            (Some(home), Some(default_root)) if default_root == self.root => {
                home.join(LEGACY_AUTH_DIR).join(LEGACY_FILE)
            }
            _ => self.root.join(LEGACY_AUTH_DIR).join(LEGACY_FILE),
        }
    }

    pub(crate) fn legacy(&self) -> LegacyAuth {
        LegacyAuth::new(self.legacy_auth_path())
    }

    /// Shelf directory for an account reference's live sessions.
    ///
    /// Team references use `vault--slug`; slugs never contain `--`, so the
    /// two namespaces cannot collide.
    pub fn shelf_dir(&self, reference: &str) -> PathBuf {
        let (vault, account) = parse_reference(reference);
        let name = if vault == PERSONAL_VAULT {
            slugify(&account)
        } else {
            format!("{}--{}", vault, slugify(&account))
        };
        self.root.join(SHELF_DIR).join(name)
    }
}

fn apply_env_override(mut config: Config) -> Config {
    if let Some(active) = std::env::var(ENV_ACTIVE_ACCOUNT)
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        config.active_account = Some(active);
    }
    config
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
