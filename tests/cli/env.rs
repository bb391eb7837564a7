//! Tests for `env add|rm|list`.

use crate::support::*;

#[test]
fn test_env_add_list_rm() {
    let t = Test::with_accounts(&[("work", "sk")]);
    assert_success(&t.switch("work"));

    assert_success(&t.run_args(&["env", "add", "AWS_REGION", "eu-west-1-long"]));

    let output = t.run_args(&["env", "list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "AWS_REGION");
    assert!(!stdout(&output).contains("eu-west-1-long"));

    let output = t.run_args(&["env", "list", "--show-secrets"]);
    assert_stdout_contains(&output, "eu-west-1-long");

    assert_success(&t.run_args(&["env", "rm", "AWS_REGION"]));
    let output = t.run_args(&["env", "list"]);
    assert_stdout_contains(&output, "no environment variables");
}

#[test]
fn test_env_add_rejects_invalid_name() {
    let t = Test::with_accounts(&[("work", "sk")]);
    assert_success(&t.switch("work"));

    let output = t.run_args(&["env", "add", "1BAD", "x"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid environment variable name");
}

#[test]
fn test_env_requires_active_account() {
    let t = Test::with_accounts(&[("work", "sk")]);
    let output = t.run_args(&["env", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no active account");
}
