//! Environment variables stored on the active account.

use crate::cli::{output, Context};
use crate::core::domain::Account;
use crate::core::manager::{parse_reference, ConfigManager};
use crate::error::Result;

/// Set a variable on the active account.
pub fn add(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut manager = ctx.open()?;
    let (reference, mut account) = manager.get_active()?;

    account.set_env_var(key, value)?;
    store(&mut manager, &reference, &mut account)?;

    output::success(&format!("set {} for {}", output::key(key), reference));
    Ok(())
}

/// Remove a variable from the active account.
pub fn rm(ctx: &Context, key: &str) -> Result<()> {
    let mut manager = ctx.open()?;
    let (reference, mut account) = manager.get_active()?;

    if account.remove_env_var(key)?.is_none() {
        output::warn(&format!("{} is not set", key));
        return Ok(());
    }
    store(&mut manager, &reference, &mut account)?;

    output::success(&format!("removed {}", output::key(key)));
    Ok(())
}

/// List the active account's variables.
pub fn list(ctx: &Context, show_secrets: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    let (reference, account) = manager.get_active()?;

    if account.env_vars().is_empty() {
        output::dimmed(&format!("no environment variables for {}", reference));
        return Ok(());
    }

    output::header(&format!("env vars ({})", reference));
    output::rule();
    for (key, value) in account.env_vars() {
        if show_secrets {
            output::kv(key, value);
        } else {
            output::kv(key, output::mask(value));
        }
    }
    Ok(())
}

/// Save back into the vault the active reference points at.
fn store(manager: &mut ConfigManager, reference: &str, account: &mut Account) -> Result<()> {
    let (vault, _) = parse_reference(reference);
    manager.vault_mut(&vault)?.save(account)
}
