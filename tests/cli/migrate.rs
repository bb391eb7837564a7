//! Tests for `migrate`.

use serde_json::json;

use crate::support::*;

#[test]
fn test_migrate_imports_and_skips_existing() {
    let t = Test::with_accounts(&[("keep", "sk-existing")]);
    let old = t.home.path().join("old-manager");
    write_old_layout_account(&old, "keep", &json!({"api_key": "sk-old"}));
    write_old_layout_account(&old, "fresh", &json!({"tokens": {"access_token": "at"}}));

    let output = t.run_args(&["migrate", old.to_str().unwrap()]);
    assert_success(&output);
    assert_stdout_contains(&output, "imported 1");

    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    let accounts = json(&output);
    assert_eq!(accounts[0]["name"], "fresh");
    assert_eq!(accounts[0]["type"], "oauth");
    assert_eq!(accounts[1]["api_key"], "sk-existing");

    assert_success(&t.run_args(&["migrate", old.to_str().unwrap(), "--force"]));
    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    assert_eq!(json(&output)[1]["api_key"], "sk-old");
}

#[test]
fn test_migrate_rejects_non_legacy_dir() {
    let t = Test::init();
    let output = t.run_args(&["migrate", t.home.path().to_str().unwrap()]);
    assert_failure(&output);
    assert_stderr_contains(&output, "legacy project");
}
