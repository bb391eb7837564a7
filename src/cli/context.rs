//! Active account commands: switch, status.

use serde_json::json;

use crate::cli::{output, Context};
use crate::error::Result;

/// Switch the active account and sync the legacy auth file.
pub fn switch(ctx: &Context, name: &str) -> Result<()> {
    let mut manager = ctx.open()?;
    let reference = manager.switch_account(name)?;
    output::success(&format!("switched to {}", output::key(&reference)));
    Ok(())
}

/// Show the active account and whether the legacy file matches it.
pub fn status(ctx: &Context, json: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    let active = manager.active_account();
    let report = manager.check_active_integrity();

    if json {
        let value = json!({
            "active_account": active,
            "status": if active.is_some() { "active" } else { "none" },
            "integrity": report,
            "legacy_auth_file": manager.legacy_auth_path(),
        });
        output::data(&serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let Some(active) = active else {
        output::warn("no active account selected");
        output::hint("run: codex-account switch <name>");
        return Ok(());
    };

    output::kv("active", output::key(&active));
    output::kv("auth file", manager.legacy_auth_path().display());
    output::kv("key store", manager.store_name());

    if !report.exists {
        output::error(&format!("active account '{}' not found in storage", active));
    } else if !report.legacy_exists {
        output::warn("legacy auth file missing");
        output::hint(&format!("run: codex-account switch {}", active));
    } else if !report.synced {
        output::warn("legacy auth file is out of sync");
        output::hint(&format!("run: codex-account switch {}", active));
    } else {
        output::success("synced and ready");
    }
    Ok(())
}
