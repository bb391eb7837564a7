//! Account commands: init, add, save, list, rm, encrypt-all.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Input, Password};
use serde_json::Value;
use tracing::info;

use crate::cli::{output, Context};
use crate::core::domain::Account;
use crate::core::manager::{canonical_reference, parse_reference};
use crate::core::slug::slugify;
use crate::error::{AccountError, Error, Result, ValidationError};

/// Initialize the storage root.
pub fn init(ctx: &Context) -> Result<()> {
    let manager = ctx.open()?;
    output::success(&format!("initialized {}", manager.root().display()));
    output::kv("key store", manager.store_name());
    Ok(())
}

/// Add an account, prompting for anything not given on the command line.
pub fn add(
    ctx: &Context,
    name: Option<String>,
    email: Option<String>,
    api_key: Option<String>,
    tags: Vec<String>,
    force: bool,
) -> Result<()> {
    let interactive = io::stdin().is_terminal();
    let mut prompted = false;

    let name = match name {
        Some(name) => name,
        None if interactive => {
            prompted = true;
            Input::new()
                .with_prompt("Account name (e.g. work)")
                .interact_text()?
        }
        None => return Err(ValidationError::EmptyName(String::new()).into()),
    };

    let mut manager = ctx.open()?;
    if manager.contains(&name) && !force {
        return Err(AccountError::AlreadyExists(name).into());
    }

    let email = match email {
        Some(email) => Some(email),
        None if interactive => {
            prompted = true;
            let email: String = Input::new()
                .with_prompt("Email")
                .allow_empty(true)
                .interact_text()?;
            Some(email)
        }
        None => None,
    };

    let api_key = match api_key {
        Some(key) => key,
        None if interactive => {
            prompted = true;
            Password::new().with_prompt("API key").interact()?
        }
        None => return Err(ValidationError::NoCredentials.into()),
    };

    let tags = if tags.is_empty() && prompted {
        let raw: String = Input::new()
            .with_prompt("Tags (comma separated, optional)")
            .allow_empty(true)
            .interact_text()?;
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        tags
    };

    let mut builder = Account::builder(name).api_key(api_key).tags(tags);
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        builder = builder.email(email);
    }
    let mut account = builder.build()?;

    manager.save_account(&mut account)?;
    info!(account = %account.name(), "added account");
    output::success(&format!("added {}", output::key(account.name())));
    Ok(())
}

/// Save the credentials in the legacy auth file as a new account.
pub fn save(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    let mut account = manager.capture_legacy_auth(name)?;

    if manager.contains(name) && !force {
        return Err(AccountError::AlreadyExists(name.to_string()).into());
    }

    manager.save_account(&mut account)?;
    output::success(&format!(
        "saved current session as {}",
        output::key(account.name())
    ));
    Ok(())
}

/// List accounts from every vault.
pub fn list(ctx: &Context, json: bool, tag: Option<&str>, show_secrets: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    let mut accounts = manager.list_accounts()?;
    if let Some(tag) = tag {
        accounts.retain(|a| a.has_tag(tag));
    }
    let active = manager.active_account().map(|r| normalize(&r));

    if json {
        let mut records = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let mut record = serde_json::to_value(account)?;
            if !show_secrets {
                redact(&mut record);
            }
            records.push(record);
        }
        output::data(&serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if accounts.is_empty() {
        output::dimmed("no accounts stored");
        output::hint("run: codex-account add");
        return Ok(());
    }

    output::header(&format!("{} accounts", output::count(accounts.len())));
    output::rule();
    let width = accounts.iter().map(|a| a.name().len()).max().unwrap_or(0);
    for account in &accounts {
        let marker = if active.as_deref() == Some(account.name()) {
            "*"
        } else {
            " "
        };
        let mut line = format!(
            "{} {:<width$}  {:<7}  {}",
            marker,
            account.name(),
            account.kind().as_str(),
            account.created_at().format("%Y-%m-%d"),
            width = width
        );
        if let Some(email) = account.email() {
            line.push_str(&format!("  {}", email));
        }
        if !account.tags().is_empty() {
            line.push_str(&format!("  [{}]", account.tags().join(", ")));
        }
        if show_secrets {
            line.push_str(&format!("  {}", credential(account)));
        }
        println!("{}", line);
    }
    Ok(())
}

/// Remove an account after confirmation.
pub fn rm(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let mut manager = ctx.open()?;
    if !manager.contains(name) {
        return Err(AccountError::NotFound(name.to_string()).into());
    }

    if !force {
        if !io::stdin().is_terminal() {
            return Err(Error::Other(
                "refusing to delete without confirmation (use --force)".to_string(),
            ));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete account {}?", output::key(name)))
            .default(false)
            .interact()?;
        if !confirmed {
            output::dimmed("cancelled");
            return Ok(());
        }
    }

    manager.remove_account(name)?;
    output::success(&format!("removed {}", output::key(name)));
    Ok(())
}

/// Re-save every account, migrating plaintext records.
pub fn encrypt_all(ctx: &Context, yes: bool) -> Result<()> {
    let mut manager = ctx.open()?;

    if !yes && io::stdin().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt("Re-encrypt every account on disk?")
            .default(true)
            .interact()?;
        if !confirmed {
            output::dimmed("cancelled");
            return Ok(());
        }
    }

    let summary = manager.encrypt_all();
    for (item, reason) in &summary.failures {
        output::error(&format!("{}: {}", item, reason));
    }
    output::success(&format!(
        "encrypted {}/{} accounts",
        summary.succeeded,
        summary.total()
    ));

    if summary.failed > 0 {
        return Err(Error::Other(format!(
            "{} account(s) could not be re-encrypted",
            summary.failed
        )));
    }
    Ok(())
}

/// Canonical form of a user-supplied reference.
pub(crate) fn normalize(reference: &str) -> String {
    let (vault, name) = parse_reference(reference);
    canonical_reference(&vault, &slugify(&name))
}

fn credential(account: &Account) -> String {
    if let Some(key) = account.api_key() {
        key.to_string()
    } else if let Some(token) = account.access_token() {
        format!("{} (oauth)", output::mask(token))
    } else {
        "-".to_string()
    }
}

fn redact(record: &mut Value) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    if obj.get("api_key").is_some_and(|v| !v.is_null()) {
        obj.insert("api_key".into(), Value::from("********"));
    }
    if let Some(Value::Object(tokens)) = obj.get_mut("tokens") {
        for value in tokens.values_mut() {
            *value = Value::from("********");
        }
    }
    if let Some(Value::Object(vars)) = obj.get_mut("env_vars") {
        for value in vars.values_mut() {
            *value = Value::from("********");
        }
    }
}
