//! Audit event types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::account::parse_timestamp;

/// Kind of audited event. Stored as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditKind {
    /// Credentials were decrypted for use.
    Access,
    /// An account was written.
    Modify,
    /// An account was removed.
    Delete,
    /// A degraded operation (e.g. an unreadable team key).
    Error,
    Other(String),
}

impl AuditKind {
    pub fn as_str(&self) -> &str {
        match self {
            AuditKind::Access => "access",
            AuditKind::Modify => "modify",
            AuditKind::Delete => "delete",
            AuditKind::Error => "error",
            AuditKind::Other(s) => s,
        }
    }
}

impl From<String> for AuditKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "access" => AuditKind::Access,
            "modify" => AuditKind::Modify,
            "delete" => AuditKind::Delete,
            "error" => AuditKind::Error,
            _ => AuditKind::Other(s),
        }
    }
}

impl From<&str> for AuditKind {
    fn from(s: &str) -> Self {
        AuditKind::from(s.to_string())
    }
}

impl From<AuditKind> for String {
    fn from(kind: AuditKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(deserialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub event: AuditKind,
    /// Account reference, vault-qualified for team vaults.
    pub account: String,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event,
            self.account,
            if self.success { "" } else { " (failed)" }
        )
    }
}

fn default_success() -> bool {
    true
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
