//! Outcome of bulk operations.

use serde::Serialize;

/// Per-item tally of a batch operation (re-encryption, migration).
///
/// A failing item is recorded and processing continues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `(item, reason)` for every failed item.
    pub failures: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn fail(&mut self, item: impl Into<String>, reason: impl ToString) {
        self.failed += 1;
        self.failures.push((item.into(), reason.to_string()));
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}
