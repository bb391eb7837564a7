//! Migrate command - import from the older multi-account layout.

use std::path::Path;

use crate::cli::{output, Context};
use crate::error::{Error, Result};

pub fn execute(ctx: &Context, path: &Path, force: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    let summary = manager.ingest(path, force)?;

    for (item, reason) in &summary.failures {
        output::error(&format!("{}: {}", item, reason));
    }
    if summary.skipped > 0 {
        output::dimmed(&format!(
            "skipped {} existing account(s), use --force to overwrite",
            summary.skipped
        ));
    }
    output::success(&format!("imported {} account(s)", summary.succeeded));

    if summary.failed > 0 {
        return Err(Error::Other(format!(
            "{} account(s) failed to import",
            summary.failed
        )));
    }
    Ok(())
}
