//! Team join command.

use std::io::{self, IsTerminal};
use std::path::Path;

use dialoguer::Password;
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::{output, Context};
use crate::error::{CipherError, Result};

/// Mount an existing team vault directory with its shared key.
pub fn execute(ctx: &Context, name: &str, path: &Path, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => Zeroizing::new(key),
        None if io::stdin().is_terminal() => {
            Zeroizing::new(Password::new().with_prompt("Team key").interact()?)
        }
        None => {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Zeroizing::new(input.trim().to_string())
        }
    };
    if key.trim().is_empty() {
        return Err(CipherError::InvalidKey("key is empty".to_string()).into());
    }

    info!("Joining team: {}", name);
    let mut manager = ctx.open()?;
    let slug = manager.mount_team(name, path, &key)?;

    output::success(&format!("joined team {}", output::key(&slug)));
    output::hint(&format!("accounts are addressed as {}/<name>", slug));
    Ok(())
}
