//! Tests for `run`.

use crate::support::*;

#[cfg(unix)]
#[test]
fn test_run_injects_credentials() {
    let t = Test::with_accounts(&[("work", "sk-injected")]);
    assert_success(&t.switch("work"));
    assert_success(&t.run_args(&["env", "add", "EXTRA", "value"]));

    let output = t.run(&["sh", "-c", "echo \"$CODEX_API_KEY:$EXTRA\""]);
    assert_success(&output);
    assert_stdout_contains(&output, "sk-injected:value");
}

#[cfg(unix)]
#[test]
fn test_run_propagates_exit_code() {
    let t = Test::with_accounts(&[("work", "sk")]);
    assert_success(&t.switch("work"));

    let output = t.run(&["sh", "-c", "exit 7"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_run_command_not_found() {
    let t = Test::with_accounts(&[("work", "sk")]);
    assert_success(&t.switch("work"));

    let output = t.run(&["definitely-not-a-real-command-xyz"]);
    assert_eq!(output.status.code(), Some(127));
    assert_stderr_contains(&output, "command not found");
}

#[test]
fn test_run_without_active_account() {
    let t = Test::with_accounts(&[("work", "sk")]);
    let output = t.run(&["echo", "hi"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "switch");
}
