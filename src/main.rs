//! codex-account - encrypted local vault for Codex credentials.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codex_accounts::cli::output;
use codex_accounts::cli::{execute, Cli, Context};
use codex_accounts::error::{AccountError, CipherError, ConfigError, Error, LegacyError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("CODEX_ACCOUNT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("codex_accounts=debug")
        } else {
            EnvFilter::new("codex_accounts=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let ctx = Context::from_cli(&cli);
    if let Err(e) = execute(cli.command, &ctx) {
        let suggestion = match &e {
            Error::Config(ConfigError::NoActiveAccount) => Some("run: codex-account switch <name>"),
            Error::Account(AccountError::NotFound(_)) => Some("run: codex-account list"),
            Error::Cipher(CipherError::DecryptionFailed(_)) => {
                Some("check CODEX_MASTER_KEY and master.key belong to this vault")
            }
            Error::Legacy(LegacyError::AuthFileMissing(_)) => {
                Some("log in with codex first, or set CODEX_LEGACY_AUTH_FILE")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
