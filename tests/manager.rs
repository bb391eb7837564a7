//! Library-level scenarios against `ConfigManager`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use codex_accounts::core::domain::{Account, AccountType};
use codex_accounts::core::legacy::SessionPolicy;
use codex_accounts::core::manager::{ConfigManager, Options};
use codex_accounts::core::store::{MemoryStore, SecretStore};
use codex_accounts::core::vault::Access;
use codex_accounts::error::{AccountError, ConfigError, Error, VaultError};
use serde_json::{json, Value};
use tempfile::TempDir;

struct Env {
    tmp: TempDir,
    store: MemoryStore,
}

impl Env {
    fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
            store: MemoryStore::new(),
        }
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("root")
    }

    fn legacy(&self) -> PathBuf {
        self.tmp.path().join("codex").join("auth.json")
    }

    fn sessions(&self) -> PathBuf {
        self.tmp.path().join("codex").join("sessions")
    }

    fn open_with_policy(&self, policy: SessionPolicy) -> ConfigManager {
        let store: Arc<dyn SecretStore> = Arc::new(self.store.clone());
        ConfigManager::open_with(
            self.root(),
            Options {
                store: Some(store),
                legacy_auth_path: Some(self.legacy()),
                session_policy: policy,
            },
        )
        .unwrap()
    }

    fn open(&self) -> ConfigManager {
        self.open_with_policy(SessionPolicy::Clear)
    }

    fn legacy_json(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(self.legacy()).unwrap()).unwrap()
    }
}

fn api(name: &str, key: &str) -> Account {
    Account::builder(name).api_key(key).build().unwrap()
}

fn names(accounts: &[Account]) -> Vec<String> {
    accounts.iter().map(|a| a.name().to_string()).collect()
}

#[test]
fn test_add_and_retrieve() {
    let env = Env::new();
    let mut manager = env.open();

    manager.save_account(&mut api("Work Account", "sk-123")).unwrap();

    let account = manager
        .get_account("Work Account", Access::Metadata)
        .unwrap();
    assert_eq!(account.name(), "work-account");
    assert_eq!(account.api_key(), Some("sk-123"));
    assert_eq!(account.kind(), AccountType::ApiKey);
}

#[test]
fn test_switch_projects_legacy_file() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("Work Account", "sk-123")).unwrap();

    let reference = manager.switch_account("work-account").unwrap();
    assert_eq!(reference, "work-account");

    let legacy = env.legacy_json();
    assert_eq!(legacy["api_key"], "sk-123");
    assert!(legacy["last_refresh"].as_str().unwrap().ends_with('Z'));
    assert_eq!(manager.config().active_account.as_deref(), Some("work-account"));

    let report = manager.check_active_integrity();
    assert!(report.is_healthy());
}

#[test]
fn test_switch_projects_oauth_tokens_flat_and_nested() {
    let env = Env::new();
    let mut manager = env.open();
    let mut account = Account::builder("oauth")
        .token("access_token", "at-1")
        .token("refresh_token", "rt-1")
        .email("me@example.com")
        .build()
        .unwrap();
    manager.save_account(&mut account).unwrap();

    manager.switch_account("oauth").unwrap();

    let legacy = env.legacy_json();
    assert_eq!(legacy["tokens"]["access_token"], "at-1");
    assert_eq!(legacy["access_token"], "at-1");
    assert_eq!(legacy["refresh_token"], "rt-1");
    assert_eq!(legacy["email"], "me@example.com");
    assert!(legacy.get("api_key").is_none());
}

#[test]
fn test_switch_to_missing_account_changes_nothing() {
    let env = Env::new();
    let mut manager = env.open();

    let err = manager.switch_account("ghost").unwrap_err();
    assert!(matches!(err, Error::Account(AccountError::NotFound(_))));
    assert!(!env.legacy().exists());
    assert!(manager.config().active_account.is_none());
}

#[test]
fn test_team_routing() {
    let env = Env::new();
    let mut manager = env.open();
    manager.create_team("ops", None).unwrap();

    manager.save_account(&mut api("ops/prod", "k")).unwrap();
    manager.save_account(&mut api("prod", "personal-k")).unwrap();

    let listed = manager.list_accounts().unwrap();
    assert_eq!(names(&listed), vec!["ops/prod", "prod"]);

    let team = manager.get_account("ops/prod", Access::Metadata).unwrap();
    assert_eq!(team.api_key(), Some("k"));
    let personal = manager.get_account("prod", Access::Metadata).unwrap();
    assert_eq!(personal.api_key(), Some("personal-k"));

    assert!(env
        .root()
        .join("teams/ops/accounts/prod/auth.enc")
        .exists());
}

#[test]
fn test_unknown_vault_is_vault_not_found() {
    let env = Env::new();
    let mut manager = env.open();

    let err = manager
        .get_account("nope/prod", Access::Metadata)
        .unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::NotFound(ref v)) if v == "nope"));
}

#[test]
fn test_team_vault_survives_reopen() {
    let env = Env::new();
    {
        let mut manager = env.open();
        manager.create_team("ops", None).unwrap();
        manager.save_account(&mut api("ops/prod", "k")).unwrap();
    }

    let mut manager = env.open();
    assert_eq!(manager.vault_slugs(), vec!["personal", "ops"]);
    let account = manager.get_account("ops/prod", Access::Decrypted).unwrap();
    assert_eq!(account.api_key(), Some("k"));
}

#[test]
fn test_team_key_is_stored_encrypted() {
    let env = Env::new();
    let mut manager = env.open();
    let key = manager.create_team("ops", None).unwrap();

    let config = fs::read_to_string(env.root().join("config.json")).unwrap();
    assert!(!config.contains(key.as_str()));
    assert_eq!(manager.team_key("ops").unwrap().as_str(), key.as_str());
}

#[test]
fn test_mount_team_rejections() {
    let env = Env::new();
    let mut manager = env.open();
    let key = manager.create_team("ops", None).unwrap();
    let elsewhere = env.tmp.path().join("elsewhere");

    let err = manager.mount_team("Personal", &elsewhere, &key).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::Reserved(_))));

    let err = manager.mount_team("OPS", &elsewhere, &key).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::AlreadyMounted(_))));

    let err = manager.unmount_team("ghost").unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::NotFound(_))));
}

#[test]
fn test_unmount_team_clears_active_reference() {
    let env = Env::new();
    let mut manager = env.open();
    manager.create_team("ops", None).unwrap();
    manager.save_account(&mut api("ops/prod", "k")).unwrap();
    manager.switch_account("ops/prod").unwrap();

    manager.unmount_team("ops").unwrap();
    assert!(manager.active_account().is_none());
    assert!(manager.mounts().is_empty());
    assert!(env.root().join("teams/ops/accounts/prod/auth.enc").exists());
}

#[test]
fn test_undecryptable_team_key_is_audited_not_fatal() {
    let env = Env::new();
    {
        let mut manager = env.open();
        manager.create_team("ops", None).unwrap();
    }
    let config_path = env.root().join("config.json");
    let mut config: Value = serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    config["team_keys"]["ops"] = json!("00ff");
    fs::write(&config_path, config.to_string()).unwrap();

    let mut manager = env.open();
    assert_eq!(manager.vault_slugs(), vec!["personal", "ops"]);
    assert!(manager.team_key("ops").is_err());

    let events = manager.audit().get_events(1);
    assert_eq!(events[0].account, "system/ops");
    assert!(!events[0].success);
}

#[test]
fn test_corrupted_ciphertext() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("work", "sk")).unwrap();
    fs::write(
        env.root().join("accounts/work/auth.enc"),
        b"\x13\x37 definitely not age",
    )
    .unwrap();

    let err = manager.get_account("work", Access::Metadata).unwrap_err();
    assert!(matches!(err, Error::Account(AccountError::Corrupted { .. })));
}

#[test]
fn test_listing_resilience() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("healthy", "k1")).unwrap();
    manager.save_account(&mut api("broken", "k2")).unwrap();
    fs::write(env.root().join("accounts/broken/auth.enc"), b"garbage").unwrap();

    let listed = manager.list_accounts().unwrap();
    assert_eq!(names(&listed), vec!["healthy"]);
}

#[test]
fn test_active_account_clearing() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("a", "k1")).unwrap();
    manager.save_account(&mut api("b", "k2")).unwrap();
    manager.switch_account("a").unwrap();

    manager.remove_account("b").unwrap();
    assert_eq!(manager.active_account().as_deref(), Some("a"));

    manager.remove_account("A").unwrap();
    assert!(manager.active_account().is_none());
    assert!(manager.load_config().unwrap().active_account.is_none());
}

#[test]
fn test_legacy_migration_through_manager() {
    let env = Env::new();
    let mut manager = env.open();
    let dir = env.root().join("accounts/old");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("auth.json"),
        r#"{"name": "old", "api_key": "sk-old", "created_at": "2024-01-02T03:04:05.123456"}"#,
    )
    .unwrap();

    let mut account = manager.get_account("old", Access::Metadata).unwrap();
    manager.save_account(&mut account).unwrap();

    assert!(dir.join("auth.enc").exists());
    assert!(!dir.join("auth.json").exists());
}

#[test]
fn test_integrity_reports() {
    let env = Env::new();
    let mut manager = env.open();
    assert!(!manager.check_active_integrity().exists);

    manager.save_account(&mut api("work", "sk-123")).unwrap();
    manager.switch_account("work").unwrap();
    assert!(manager.check_active_integrity().synced);

    fs::remove_file(env.legacy()).unwrap();
    let report = manager.check_active_integrity();
    assert!(report.exists);
    assert!(!report.legacy_exists);
    assert!(!report.synced);

    let account = manager.get_account("work", Access::Decrypted).unwrap();
    manager.sync_legacy_auth(&account).unwrap();
    assert!(manager.check_active_integrity().is_healthy());
}

#[test]
fn test_clear_policy_resets_sessions() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("a", "k1")).unwrap();
    fs::create_dir_all(env.sessions()).unwrap();
    fs::write(env.sessions().join("live.json"), "{}").unwrap();

    manager.switch_account("a").unwrap();
    assert!(env.sessions().is_dir());
    assert_eq!(fs::read_dir(env.sessions()).unwrap().count(), 0);
}

#[test]
fn test_shelve_policy_round_trip() {
    let env = Env::new();
    let mut manager = env.open_with_policy(SessionPolicy::Shelve);
    manager.save_account(&mut api("personal-acct", "k1")).unwrap();
    manager.create_team("ops", None).unwrap();
    manager.save_account(&mut api("ops/prod", "k2")).unwrap();

    manager.switch_account("personal-acct").unwrap();
    fs::create_dir_all(env.sessions()).unwrap();
    fs::write(env.sessions().join("mine.json"), "1").unwrap();

    manager.switch_account("ops/prod").unwrap();
    assert!(!env.sessions().join("mine.json").exists());
    assert!(env
        .root()
        .join("shelved_sessions/personal-acct/mine.json")
        .exists());
    fs::write(env.sessions().join("team.json"), "2").unwrap();

    manager.switch_account("personal-acct").unwrap();
    assert!(env.sessions().join("mine.json").exists());
    assert!(!env.sessions().join("team.json").exists());
    assert!(env
        .root()
        .join("shelved_sessions/ops--prod/team.json")
        .exists());
    assert!(!env.root().join("shelved_sessions/personal-acct").exists());
}

#[test]
fn test_reswitch_same_account_keeps_sessions_under_shelve() {
    let env = Env::new();
    let mut manager = env.open_with_policy(SessionPolicy::Shelve);
    manager.save_account(&mut api("a", "k1")).unwrap();
    manager.switch_account("a").unwrap();
    fs::write(env.sessions().join("live.json"), "{}").unwrap();

    manager.switch_account("a").unwrap();
    assert!(env.sessions().join("live.json").exists());
}

#[test]
fn test_corrupt_config_falls_back_without_overwriting() {
    let env = Env::new();
    fs::create_dir_all(env.root()).unwrap();
    fs::write(env.root().join("config.json"), "[1, 2").unwrap();

    let mut manager = env.open();
    assert!(manager.config().active_account.is_none());
    assert!(matches!(
        manager.load_config().unwrap_err(),
        Error::Config(ConfigError::Corrupted(_))
    ));
    assert_eq!(
        fs::read_to_string(env.root().join("config.json")).unwrap(),
        "[1, 2"
    );

    manager.save_account(&mut api("a", "k")).unwrap();
    manager.switch_account("a").unwrap();
    assert_eq!(
        manager.load_config().unwrap().active_account.as_deref(),
        Some("a")
    );
}

#[test]
fn test_encrypt_all_reports_per_item() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("good", "k1")).unwrap();
    manager.save_account(&mut api("bad", "k2")).unwrap();
    fs::write(env.root().join("accounts/bad/auth.enc"), b"junk").unwrap();
    let plain = env.root().join("accounts/plain");
    fs::create_dir_all(&plain).unwrap();
    fs::write(plain.join("auth.json"), r#"{"name": "plain", "api_key": "k3"}"#).unwrap();

    let summary = manager.encrypt_all();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].0, "bad");
    assert!(plain.join("auth.enc").exists());
}

#[test]
fn test_ingest_skips_existing_unless_overwrite() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("keep", "mine")).unwrap();

    let old = env.tmp.path().join("old");
    for (name, key) in [("keep", "theirs"), ("new", "fresh")] {
        let dir = old.join("accounts").join(name);
        fs::create_dir_all(dir.join("backups")).unwrap();
        fs::write(dir.join("account.json"), "{}").unwrap();
        fs::write(
            dir.join("backups/2024-01-01.auth.json"),
            json!({"api_key": "stale"}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.join("backups/2024-06-01.auth.json"),
            json!({"api_key": key}).to_string(),
        )
        .unwrap();
    }

    let summary = manager.ingest(&old, false).unwrap();
    assert_eq!((summary.succeeded, summary.skipped, summary.failed), (1, 1, 0));
    let keep = manager.get_account("keep", Access::Metadata).unwrap();
    assert_eq!(keep.api_key(), Some("mine"));
    let new = manager.get_account("new", Access::Metadata).unwrap();
    assert_eq!(new.api_key(), Some("fresh"));

    let summary = manager.ingest(&old, true).unwrap();
    assert_eq!(summary.succeeded, 2);
    let keep = manager.get_account("keep", Access::Metadata).unwrap();
    assert_eq!(keep.api_key(), Some("theirs"));
}

#[test]
fn test_capture_legacy_auth() {
    let env = Env::new();
    let manager = env.open();
    fs::create_dir_all(env.legacy().parent().unwrap()).unwrap();
    fs::write(
        env.legacy(),
        json!({"OPENAI_API_KEY": "sk-env", "email": "a@b.c"}).to_string(),
    )
    .unwrap();

    let account = manager.capture_legacy_auth("Captured").unwrap();
    assert_eq!(account.api_key(), Some("sk-env"));
    assert_eq!(account.email(), Some("a@b.c"));
    assert!(account.has_tag("imported"));
}

#[test]
fn test_active_environment() {
    let env = Env::new();
    let mut manager = env.open();
    let mut account = Account::builder("work")
        .api_key("sk-1")
        .env_var("REGION", "eu")
        .build()
        .unwrap();
    manager.save_account(&mut account).unwrap();
    manager.switch_account("work").unwrap();

    let vars = manager.active_environment().unwrap();
    assert_eq!(vars["CODEX_API_KEY"].as_str(), "sk-1");
    assert_eq!(vars["REGION"].as_str(), "eu");
}

#[test]
fn test_primary_key_lives_in_store_and_file() {
    let env = Env::new();
    let _manager = env.open();

    assert_eq!(env.store.len(), 1);
    let stored = env.store.get("codex-account-manager", "master-key").unwrap();
    let file = fs::read_to_string(env.root().join("master.key")).unwrap();
    assert_eq!(stored.as_deref(), Some(file.trim()));
}

#[test]
fn test_audit_records_operations() {
    let env = Env::new();
    let mut manager = env.open();
    manager.save_account(&mut api("work", "sk")).unwrap();
    manager.switch_account("work").unwrap();
    manager.remove_account("work").unwrap();

    let kinds: Vec<String> = manager
        .audit()
        .get_events(10)
        .iter()
        .map(|e| e.event.to_string())
        .collect();
    assert_eq!(kinds, vec!["delete", "access", "modify"]);
}
