//! Team vault commands.
//!
//! Create, join, leave, and list team vaults, and print a team's shared key.

mod join;
mod list;

pub use join::execute as join;
pub use list::execute as list;

use std::path::PathBuf;

use crate::cli::{output, Context};
use crate::error::Result;

/// Create a team vault and print its key once.
pub fn create(ctx: &Context, name: &str, path: Option<PathBuf>) -> Result<()> {
    let mut manager = ctx.open()?;
    let key = manager.create_team(name, path)?;
    let slug = crate::core::slug::slugify(name);

    output::success(&format!("created team {}", output::key(&slug)));
    output::hint("share this key with your team over a secure channel:");
    output::data(&key);
    Ok(())
}

/// Unmount a team vault. Files on disk are kept.
pub fn leave(ctx: &Context, name: &str) -> Result<()> {
    let mut manager = ctx.open()?;
    manager.unmount_team(name)?;
    output::success(&format!("left team {}", output::key(name)));
    Ok(())
}

/// Print a team's shared key.
pub fn key(ctx: &Context, name: &str) -> Result<()> {
    let mut manager = ctx.open()?;
    let key = manager.team_key(name)?;
    output::data(&key);
    Ok(())
}
