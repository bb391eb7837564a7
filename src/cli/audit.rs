//! Audit command.

use console::style;

use crate::cli::account::normalize;
use crate::cli::{output, Context};
use crate::core::domain::{AuditEvent, AuditKind};
use crate::error::Result;

/// Show recent audit events, newest first.
pub fn execute(ctx: &Context, limit: usize, account: Option<&str>, json: bool) -> Result<()> {
    let manager = ctx.open()?;
    let filter = account.map(normalize);

    let events: Vec<AuditEvent> = manager
        .audit()
        .get_events(limit)
        .into_iter()
        .filter(|e| filter.as_deref().map_or(true, |f| e.account == f))
        .collect();

    if json {
        output::data(&serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        output::dimmed("no audit events");
        return Ok(());
    }

    for event in &events {
        let kind = format!("{:<7}", event.event.to_string());
        let kind = match event.event {
            AuditKind::Delete | AuditKind::Error => style(kind).red(),
            AuditKind::Modify => style(kind).yellow(),
            AuditKind::Access => style(kind).green(),
            AuditKind::Other(_) => style(kind),
        };
        let mut line = format!(
            "{}  {}  {}",
            style(event.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
            kind,
            event.account
        );
        if !event.success {
            line.push_str(&format!("  {}", style("failed").red()));
        }
        if !event.details.is_empty() {
            line.push_str(&format!(
                "  {}",
                serde_json::Value::Object(event.details.clone())
            ));
        }
        println!("{}", line);
    }
    Ok(())
}
