//! Tests for `team create|join|leave|list|key`.

use crate::support::*;

#[test]
fn test_team_create_and_route_accounts() {
    let t = Test::init();
    let key = t.team_create("Ops");
    assert!(t.root().join("teams/ops/accounts").is_dir());

    assert_success(&t.add("ops/prod", "k-team"));
    assert!(t.root().join("teams/ops/accounts/prod/auth.enc").exists());

    let output = t.run_args(&["list", "--json", "--show-secrets"]);
    let accounts = json(&output);
    assert_eq!(accounts[0]["name"], "ops/prod");
    assert_eq!(accounts[0]["api_key"], "k-team");

    let output = t.run_args(&["team", "key", "ops"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), key);
}

#[test]
fn test_team_list_json() {
    let t = Test::init();
    t.team_create("ops");

    let output = t.run_args(&["team", "list", "--json"]);
    assert_success(&output);
    let teams = json(&output);
    assert_eq!(teams["count"], 1);
    assert_eq!(teams["teams"][0]["name"], "ops");
}

#[test]
fn test_team_join_with_shared_key() {
    let alice = Test::init();
    let key = alice.team_create("ops");
    assert_success(&alice.add("ops/prod", "k-shared"));
    let vault = alice.root().join("teams/ops");

    let bob = Test::init();
    let output = bob.run_args(&[
        "team",
        "join",
        "ops",
        vault.to_str().unwrap(),
        "--key",
        &key,
    ]);
    assert_success(&output);

    let output = bob.run_args(&["list", "--json", "--show-secrets"]);
    assert_eq!(json(&output)[0]["api_key"], "k-shared");
}

#[test]
fn test_team_join_rejects_personal_and_duplicates() {
    let t = Test::init();
    let key = t.team_create("ops");
    let dir = t.home.path().join("elsewhere");

    let output = t.run_args(&["team", "join", "personal", dir.to_str().unwrap(), "--key", &key]);
    assert_failure(&output);
    assert_stderr_contains(&output, "reserved");

    let output = t.run_args(&["team", "join", "ops", dir.to_str().unwrap(), "--key", &key]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already mounted");
}

#[test]
fn test_team_join_rejects_bad_key() {
    let t = Test::init();
    let dir = t.home.path().join("vault");
    let output = t.run_args(&["team", "join", "ops", dir.to_str().unwrap(), "--key", "nope"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid encryption key");
}

#[test]
fn test_team_leave_clears_active_team_account() {
    let t = Test::init();
    t.team_create("ops");
    assert_success(&t.add("ops/prod", "k"));
    assert_success(&t.switch("ops/prod"));

    assert_success(&t.run_args(&["team", "leave", "ops"]));
    assert!(json(&t.status_json())["active_account"].is_null());
    assert!(t.root().join("teams/ops/accounts/prod/auth.enc").exists());

    let output = t.run_args(&["list", "--json"]);
    assert_eq!(json(&output).as_array().unwrap().len(), 0);
}

#[test]
fn test_unknown_vault_reference() {
    let t = Test::init();
    let output = t.add("nope/acct", "k");
    assert_failure(&output);
    assert_stderr_contains(&output, "vault 'nope' not found");
}
