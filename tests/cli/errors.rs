//! Error reporting and hints.

use std::fs;

use crate::support::*;

#[test]
fn test_not_found_has_hint() {
    let t = Test::init();
    let output = t.switch("ghost");
    assert_failure(&output);
    assert_stderr_contains(&output, "✗ account 'ghost' not found");
    assert_stderr_contains(&output, "codex-account list");
}

#[test]
fn test_corrupt_config_is_tolerated() {
    let t = Test::with_accounts(&[("work", "sk")]);
    fs::write(t.root().join("config.json"), "{ not json").unwrap();

    let output = t.list_json();
    assert_success(&output);
    assert_eq!(json(&output)[0]["name"], "work");

    assert_eq!(
        fs::read_to_string(t.root().join("config.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_wrong_master_key_reports_corruption() {
    let t = Test::with_accounts(&[("work", "sk")]);
    let other = t.team_create("scratch");

    let output = t
        .cmd()
        .env("CODEX_MASTER_KEY", &other)
        .args(["switch", "work"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "corrupted");
}
