//! Health record for the active account.

use serde::Serialize;

/// Result of checking the active account against the legacy auth file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// The active account still resolves.
    pub exists: bool,
    /// The legacy file carries the active account's credentials.
    pub synced: bool,
    /// The legacy file is present on disk.
    pub legacy_exists: bool,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.exists && self.synced
    }
}
