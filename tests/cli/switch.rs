//! Tests for `switch` and `status`.

use std::fs;

use crate::support::*;

#[test]
fn test_switch_projects_legacy_file() {
    let t = Test::with_accounts(&[("Work Account", "sk-123")]);

    let output = t.switch("Work Account");
    assert_success(&output);
    assert_stdout_contains(&output, "work-account");

    let legacy = read_json(&t.legacy_auth());
    assert_eq!(legacy["api_key"], "sk-123");
    assert_eq!(legacy["OPENAI_API_KEY"], "sk-123");
    assert!(legacy["last_refresh"].is_string());

    let status = json(&t.status_json());
    assert_eq!(status["active_account"], "work-account");
    assert_eq!(status["integrity"]["synced"], true);
}

#[test]
fn test_switch_clears_sessions() {
    let t = Test::with_accounts(&[("a", "k1"), ("b", "k2")]);
    assert_success(&t.switch("a"));

    let sessions = t.legacy_auth().parent().unwrap().join("sessions");
    fs::create_dir_all(&sessions).unwrap();
    fs::write(sessions.join("s1.json"), "{}").unwrap();

    assert_success(&t.switch("b"));
    assert!(sessions.is_dir());
    assert_eq!(fs::read_dir(&sessions).unwrap().count(), 0);
}

#[test]
fn test_switch_shelves_sessions_when_asked() {
    let t = Test::with_accounts(&[("a", "k1"), ("b", "k2")]);
    assert_success(&t.run_args(&["--shelve-sessions", "switch", "a"]));

    let sessions = t.legacy_auth().parent().unwrap().join("sessions");
    fs::create_dir_all(&sessions).unwrap();
    fs::write(sessions.join("from-a.json"), "{}").unwrap();

    assert_success(&t.run_args(&["--shelve-sessions", "switch", "b"]));
    assert!(!sessions.join("from-a.json").exists());
    assert!(t
        .root()
        .join("shelved_sessions/a/from-a.json")
        .exists());

    assert_success(&t.run_args(&["--shelve-sessions", "switch", "a"]));
    assert!(sessions.join("from-a.json").exists());
}

#[test]
fn test_switch_unknown_account_fails() {
    let t = Test::init();
    let output = t.switch("ghost");
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
    assert!(!t.legacy_auth().exists());
}

#[test]
fn test_status_reports_out_of_sync() {
    let t = Test::with_accounts(&[("work", "sk-123")]);
    assert_success(&t.switch("work"));
    write_legacy_auth(
        &t.legacy_auth(),
        &serde_json::json!({"api_key": "sk-other", "last_refresh": "x"}),
    );

    let output = t.run_args(&["status"]);
    assert_success(&output);
    assert_stderr_contains(&output, "out of sync");
}

#[test]
fn test_status_without_active_account() {
    let t = Test::init();
    let status = json(&t.status_json());
    assert!(status["active_account"].is_null());
    assert_eq!(status["status"], "none");
}

#[test]
fn test_active_account_env_override() {
    let t = Test::with_accounts(&[("a", "k1"), ("b", "k2")]);
    assert_success(&t.switch("a"));

    let output = t
        .cmd()
        .env("CODEX_ACTIVE_ACCOUNT", "b")
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert_eq!(json(&output)["active_account"], "b");

    let persisted = read_json(&t.root().join("config.json"));
    assert_eq!(persisted["active_account"], "a");
}

#[test]
fn test_rm_active_account_clears_it() {
    let t = Test::with_accounts(&[("a", "k1"), ("b", "k2")]);
    assert_success(&t.switch("a"));

    assert_success(&t.run_args(&["rm", "b", "--force"]));
    assert_eq!(json(&t.status_json())["active_account"], "a");

    assert_success(&t.run_args(&["rm", "a", "--force"]));
    assert!(json(&t.status_json())["active_account"].is_null());
}
