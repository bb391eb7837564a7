//! Test support utilities for codex-account integration tests.
//!
//! Provides an isolated environment per test and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated home directory.
///
/// The storage root resolves to `<home>/.codex-accounts` and the legacy auth
/// file to `<home>/.codex/auth.json`. No process-global state is mutated, so
/// tests run in parallel.
pub struct Test {
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        Self { home }
    }

    /// Environment with the storage root initialized.
    pub fn init() -> Self {
        let t = Self::new();
        assert_success(&t.run_args(&["init"]));
        t
    }

    /// Environment with api-key accounts already added.
    pub fn with_accounts(accounts: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (name, key) in accounts {
            let output = t.add(name, key);
            assert!(
                output.status.success(),
                "Failed to add account {}: {}",
                name,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    pub fn root(&self) -> PathBuf {
        self.home.path().join(".codex-accounts")
    }

    pub fn legacy_auth(&self) -> PathBuf {
        self.home.path().join(".codex").join("auth.json")
    }
}
