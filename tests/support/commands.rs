//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// A codex-account command isolated to this test's home.
    ///
    /// The OS keyring is disabled and every override variable that could
    /// leak in from the developer's shell is cleared.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd =
            Command::cargo_bin("codex-account").expect("failed to find codex-account binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("CODEX_NO_KEYRING", "1");
        cmd.env("NO_COLOR", "1");
        for var in [
            "CODEX_ACCOUNTS_HOME",
            "CODEX_MASTER_KEY",
            "CODEX_ACTIVE_ACCOUNT",
            "CODEX_LEGACY_AUTH_FILE",
            "CODEX_TEAM_KEY",
            "CODEX_ACCOUNT_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.home.path());
        cmd
    }

    pub fn run_args(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run codex-account")
    }

    /// Shortcut for `codex-account add NAME --api-key KEY`.
    pub fn add(&self, name: &str, key: &str) -> Output {
        self.run_args(&["add", name, "--api-key", key])
    }

    pub fn switch(&self, name: &str) -> Output {
        self.run_args(&["switch", name])
    }

    pub fn list_json(&self) -> Output {
        self.run_args(&["list", "--json"])
    }

    pub fn status_json(&self) -> Output {
        self.run_args(&["status", "--json"])
    }

    /// Shortcut for `codex-account run -- ARGS...`.
    pub fn run(&self, args: &[&str]) -> Output {
        let mut full = vec!["run", "--"];
        full.extend_from_slice(args);
        self.run_args(&full)
    }

    /// Create a team and return its printed key.
    pub fn team_create(&self, name: &str) -> String {
        let output = self.run_args(&["team", "create", name]);
        super::assert_success(&output);
        super::stdout(&output)
            .lines()
            .find(|l| l.starts_with("AGE-SECRET-KEY-"))
            .expect("team key not printed")
            .to_string()
    }
}
