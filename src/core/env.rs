//! Environment injection for subprocesses.
//!
//! Credentials are decrypted in memory and handed to the child process
//! through its environment; nothing is written to disk.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::{INJECT_ACCESS_TOKEN, INJECT_API_KEY};
use crate::core::domain::Account;
use crate::error::{Error, Result};

/// Variables injected for `account`.
///
/// Custom `env_vars` first, then `CODEX_API_KEY` when an api key exists and
/// `CODEX_ACCESS_TOKEN` when the token set has a string `access_token`.
/// The standard names win over custom variables of the same name.
pub fn injection(account: &Account) -> BTreeMap<String, Zeroizing<String>> {
    let mut vars: BTreeMap<String, Zeroizing<String>> = account
        .env_vars()
        .iter()
        .map(|(k, v)| (k.clone(), Zeroizing::new(v.clone())))
        .collect();

    if let Some(key) = account.api_key() {
        vars.insert(INJECT_API_KEY.to_string(), Zeroizing::new(key.to_string()));
    }
    if let Some(token) = account.access_token() {
        vars.insert(
            INJECT_ACCESS_TOKEN.to_string(),
            Zeroizing::new(token.to_string()),
        );
    }
    vars
}

/// Run `command` with `account`'s variables added to the inherited
/// environment, returning the child's exit code (`128 + signal` when the
/// child was killed, so an interrupted child yields 130).
///
/// # Errors
///
/// Returns `Error::Other` for an empty command and `Error::Io` if the
/// process cannot be spawned (e.g. `NotFound` for an unknown program).
pub fn run(account: &Account, command: &[String]) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::Other("no command specified".to_string()))?;

    let vars = injection(account);
    debug!(
        account = %account.name(),
        program = %program,
        injected = vars.len(),
        "running command"
    );

    let status = Command::new(program)
        .args(args)
        .envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .status()?;

    Ok(exit_code(status))
}

/// Exit code for a finished child; `128 + signal` when it was killed.
#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
