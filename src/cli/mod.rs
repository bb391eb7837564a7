//! Command-line interface.

pub mod account;
pub mod audit;
pub mod completions;
pub mod context;
pub mod env;
pub mod migrate;
pub mod output;
pub mod run;
pub mod team;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants::ENV_HOME;
use crate::core::legacy::SessionPolicy;
use crate::core::manager::{self, ConfigManager, Options};
use crate::error::Result;

/// codex-account - encrypted local vault for Codex credentials.
#[derive(Parser)]
#[command(
    name = "codex-account",
    about = "Encrypted local vault for Codex credentials",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage root (default: ~/.codex-accounts)
    #[arg(long, global = true, env = ENV_HOME)]
    pub root: Option<PathBuf>,

    /// Keep each account's live sessions on a shelf instead of clearing them
    #[arg(long, global = true)]
    pub shelve_sessions: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the storage root and master key
    Init,

    /// Add a new account (prompts for missing fields)
    Add {
        /// Account name
        name: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// API key
        #[arg(long)]
        api_key: Option<String>,
        /// Tag for categorization (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Overwrite an existing account
        #[arg(short, long)]
        force: bool,
    },

    /// Save the current legacy auth file as a new account
    Save {
        /// Account name
        name: String,
        /// Overwrite an existing account
        #[arg(short, long)]
        force: bool,
    },

    /// List accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only accounts with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Show credentials in output
        #[arg(long)]
        show_secrets: bool,
    },

    /// Switch the active account
    Switch {
        /// Account reference (`name` or `team/name`)
        name: String,
    },

    /// Remove an account
    Rm {
        /// Account reference
        name: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show the active account and its sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a command with the active account's credentials injected
    Run {
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Manage environment variables of the active account
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Manage team vaults
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Show recent audit events
    Audit {
        /// Number of events to show
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
        /// Only events for this account reference
        #[arg(long)]
        account: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import accounts from an older multi-account directory
    Migrate {
        /// Root of the old layout (contains `accounts/`)
        path: PathBuf,
        /// Overwrite accounts that already exist
        #[arg(short, long)]
        force: bool,
    },

    /// Re-save every account in encrypted form
    EncryptAll {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Env subcommands.
#[derive(Subcommand)]
pub enum EnvAction {
    /// Set a variable
    Add {
        /// Variable name (e.g. AWS_REGION)
        key: String,
        /// Value to store
        value: String,
    },
    /// Remove a variable
    Rm {
        /// Variable name
        key: String,
    },
    /// List variables
    List {
        /// Show values unmasked
        #[arg(long)]
        show_secrets: bool,
    },
}

/// Team subcommands.
#[derive(Subcommand)]
pub enum TeamAction {
    /// Create a new team vault and print its shared key
    Create {
        /// Team name
        name: String,
        /// Vault directory (default: <root>/teams/<name>)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Mount an existing team vault directory
    Join {
        /// Team name
        name: String,
        /// Vault directory
        path: PathBuf,
        /// Shared team key (prompted when omitted)
        #[arg(long, env = "CODEX_TEAM_KEY", hide_env_values = true)]
        key: Option<String>,
    },
    /// Unmount a team vault (files are kept)
    Leave {
        /// Team name
        name: String,
    },
    /// List mounted team vaults
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a team's shared key
    Key {
        /// Team name
        name: String,
    },
}

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub root: Option<PathBuf>,
    pub session_policy: SessionPolicy,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            root: cli.root.clone(),
            session_policy: if cli.shelve_sessions {
                SessionPolicy::Shelve
            } else {
                SessionPolicy::Clear
            },
        }
    }

    /// Open the storage root.
    pub fn open(&self) -> Result<ConfigManager> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => manager::default_root()?,
        };
        ConfigManager::open_with(
            root,
            Options {
                session_policy: self.session_policy,
                ..Options::default()
            },
        )
    }
}

/// Execute a command.
///
/// # Errors
///
/// Returns error if the command execution fails.
pub fn execute(command: Command, ctx: &Context) -> Result<()> {
    use Command::*;

    match command {
        Init => account::init(ctx),
        Add {
            name,
            email,
            api_key,
            tags,
            force,
        } => account::add(ctx, name, email, api_key, tags, force),
        Save { name, force } => account::save(ctx, &name, force),
        List {
            json,
            tag,
            show_secrets,
        } => account::list(ctx, json, tag.as_deref(), show_secrets),
        Switch { name } => context::switch(ctx, &name),
        Rm { name, force } => account::rm(ctx, &name, force),
        Status { json } => context::status(ctx, json),
        Run { command } => run::execute(ctx, &command),
        Env { action } => match action {
            EnvAction::Add { key, value } => env::add(ctx, &key, &value),
            EnvAction::Rm { key } => env::rm(ctx, &key),
            EnvAction::List { show_secrets } => env::list(ctx, show_secrets),
        },
        Team { action } => match action {
            TeamAction::Create { name, path } => team::create(ctx, &name, path),
            TeamAction::Join { name, path, key } => team::join(ctx, &name, &path, key),
            TeamAction::Leave { name } => team::leave(ctx, &name),
            TeamAction::List { json } => team::list(ctx, json),
            TeamAction::Key { name } => team::key(ctx, &name),
        },
        Audit {
            limit,
            account,
            json,
        } => audit::execute(ctx, limit, account.as_deref(), json),
        Migrate { path, force } => migrate::execute(ctx, &path, force),
        EncryptAll { yes } => account::encrypt_all(ctx, yes),
        Completions { shell } => completions::execute(shell),
    }
}
