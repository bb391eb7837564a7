//! Append-only audit log.
//!
//! One JSON object per line in `<root>/audit.log`. Writing never fails the
//! calling operation and reading never errors: the log is a diagnostic trail,
//! not a source of truth.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::constants::AUDIT_FILE;
use crate::core::domain::{AuditEvent, AuditKind};

/// Handle to the audit log file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Audit log stored at `<root>/audit.log`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(AUDIT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event. I/O failures are logged and swallowed.
    pub fn log_event(
        &self,
        kind: impl Into<AuditKind>,
        account: &str,
        details: Option<Map<String, Value>>,
        success: bool,
    ) {
        let event = AuditEvent {
            timestamp: Utc::now(),
            event: kind.into(),
            account: account.to_string(),
            success,
            details: details.unwrap_or_default(),
        };

        if let Err(e) = self.append(&event) {
            warn!(path = %self.path.display(), error = %e, "failed to write audit event");
        } else {
            debug!(event = %event.event, account, success, "audit");
        }
    }

    fn append(&self, event: &AuditEvent) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// The last `limit` events, newest first.
    ///
    /// Corrupt lines within the window are skipped. A missing or unreadable
    /// file yields an empty list.
    pub fn get_events(&self, limit: usize) -> Vec<AuditEvent> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "failed to read audit log");
                }
                return Vec::new();
            }
        };

        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(limit);

        lines[start..]
            .iter()
            .rev()
            .filter_map(|line| match serde_json::from_str::<AuditEvent>(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(error = %e, "skipping corrupt audit line");
                    None
                }
            })
            .collect()
    }
}

/// Build a details map from `(key, value)` pairs.
pub fn details<I, K, V>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
