//! Team list command.

use crate::cli::{output, Context};
use crate::error::Result;

/// List mounted team vaults.
pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let manager = ctx.open()?;
    let mounts = manager.mounts();

    if json {
        let teams: Vec<_> = mounts
            .iter()
            .map(|(slug, path)| serde_json::json!({ "name": slug, "path": path }))
            .collect();
        let result = serde_json::json!({ "teams": teams, "count": mounts.len() });
        output::data(&serde_json::to_string_pretty(&result)?);
    } else if mounts.is_empty() {
        output::dimmed("no team vaults mounted");
    } else {
        output::header(&format!("{} team vaults", output::count(mounts.len())));
        output::rule();
        for (slug, path) in &mounts {
            output::kv(slug, path.display());
        }
    }
    Ok(())
}
