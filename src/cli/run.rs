//! Run command.
//!
//! Executes a command with the active account's credentials injected as
//! environment variables.

use std::io::ErrorKind;

use crate::cli::{output, Context};
use crate::core::env;
use crate::error::{Error, Result};

const EXIT_NOT_FOUND: i32 = 127;

/// Run a command and exit with its exit code.
pub fn execute(ctx: &Context, command: &[String]) -> Result<()> {
    let mut manager = ctx.open()?;
    let (_, account) = manager.get_active()?;

    let code = match env::run(&account, command) {
        Ok(code) => code,
        Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            output::error(&format!("command not found: {}", command[0]));
            EXIT_NOT_FOUND
        }
        Err(e) => return Err(e),
    };
    std::process::exit(code);
}
