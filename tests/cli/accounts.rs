//! Tests for `init`, `add`, `save`, `list`, `rm` and `encrypt-all`.

use std::fs;

use serde_json::json;

use crate::support::*;

#[test]
fn test_init_creates_root_and_key() {
    let t = Test::new();
    let output = t.run_args(&["init"]);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");

    assert!(t.root().join("master.key").exists());
    let gitignore = fs::read_to_string(t.root().join(".gitignore")).unwrap();
    assert!(gitignore.contains("!accounts/*/auth.enc"));
}

#[test]
fn test_add_then_list_redacts_secrets() {
    let t = Test::with_accounts(&[("Work Account", "sk-secret-123")]);

    let output = t.list_json();
    assert_success(&output);
    let accounts = json(&output);
    assert_eq!(accounts[0]["name"], "work-account");
    assert_eq!(accounts[0]["type"], "api_key");
    assert_eq!(accounts[0]["api_key"], "********");
    assert!(!stdout(&output).contains("sk-secret-123"));

    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    assert_eq!(json(&output)[0]["api_key"], "sk-secret-123");
}

#[test]
fn test_stored_account_is_encrypted() {
    let t = Test::with_accounts(&[("work", "sk-plain-text-check")]);

    let raw = fs::read_to_string(t.root().join("accounts/work/auth.enc")).unwrap();
    assert!(raw.contains("BEGIN AGE ENCRYPTED FILE"));
    assert!(!raw.contains("sk-plain-text-check"));
}

#[test]
fn test_add_duplicate_requires_force() {
    let t = Test::with_accounts(&[("work", "sk-1")]);

    let output = t.add("work", "sk-2");
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");

    assert_success(&t.run_args(&["add", "work", "--api-key", "sk-2", "--force"]));
    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    assert_eq!(json(&output)[0]["api_key"], "sk-2");
}

#[test]
fn test_list_filters_by_tag() {
    let t = Test::init();
    assert_success(&t.run_args(&["add", "a", "--api-key", "k1", "--tag", "prod"]));
    assert_success(&t.run_args(&["add", "b", "--api-key", "k2", "--tag", "dev"]));

    let output = t.run_args(&["list", "--json", "--tag", "prod"]);
    let accounts = json(&output);
    assert_eq!(accounts.as_array().unwrap().len(), 1);
    assert_eq!(accounts[0]["name"], "a");
}

#[test]
fn test_list_empty() {
    let t = Test::init();
    let output = t.run_args(&["list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no accounts");
}

#[test]
fn test_save_captures_legacy_auth_file() {
    let t = Test::init();
    write_legacy_auth(
        &t.legacy_auth(),
        &json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "email": "me@example.com"
        }),
    );

    let output = t.run_args(&["save", "Logged In"]);
    assert_success(&output);

    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    let account = &json(&output)[0];
    assert_eq!(account["name"], "logged-in");
    assert_eq!(account["type"], "oauth");
    assert_eq!(account["email"], "me@example.com");
    assert_eq!(account["tokens"]["access_token"], "at-1");
    assert_eq!(account["tags"], json!(["imported"]));
}

#[test]
fn test_save_without_legacy_file_fails() {
    let t = Test::init();
    let output = t.run_args(&["save", "x"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
}

#[test]
fn test_rm_requires_force_when_non_interactive() {
    let t = Test::with_accounts(&[("work", "sk")]);

    assert_failure(&t.run_args(&["rm", "work"]));
    assert!(t.root().join("accounts/work").exists());

    assert_success(&t.run_args(&["rm", "work", "--force"]));
    assert!(!t.root().join("accounts/work").exists());
}

#[test]
fn test_rm_missing_account() {
    let t = Test::init();
    let output = t.run_args(&["rm", "ghost", "--force"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
}

#[test]
fn test_encrypt_all_migrates_plaintext() {
    let t = Test::with_accounts(&[("work", "sk")]);
    let legacy_dir = t.root().join("accounts/old");
    fs::create_dir_all(&legacy_dir).unwrap();
    fs::write(
        legacy_dir.join("auth.json"),
        r#"{"name": "old", "api_key": "sk-old"}"#,
    )
    .unwrap();

    let output = t.run_args(&["encrypt-all", "--yes"]);
    assert_success(&output);
    assert_stdout_contains(&output, "encrypted 2/2");

    assert!(legacy_dir.join("auth.enc").exists());
    assert!(!legacy_dir.join("auth.json").exists());
}

#[test]
fn test_audit_json_lists_newest_first() {
    let t = Test::with_accounts(&[("a", "k1"), ("b", "k2")]);
    assert_success(&t.run_args(&["rm", "a", "--force"]));

    let output = t.run_args(&["audit", "--json", "--limit", "2"]);
    assert_success(&output);
    let events = json(&output);
    assert_eq!(events[0]["event"], "delete");
    assert_eq!(events[0]["account"], "a");
    assert_eq!(events[1]["event"], "modify");
    assert_eq!(events[1]["account"], "b");
}

#[test]
fn test_completions() {
    let t = Test::new();
    let output = t.run_args(&["completions", "bash"]);
    assert_success(&output);
    assert_stdout_contains(&output, "codex-account");
}
