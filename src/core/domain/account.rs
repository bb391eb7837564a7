//! Account type.
//!
//! One credential set for the external service. An account always carries
//! at least one of an api key, an OAuth token set, or custom environment
//! variables; the constructor refuses anything else, and deserialization goes
//! through the same check.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// OAuth token fields (access/refresh/id token, expiry, ...).
pub type Tokens = BTreeMap<String, serde_json::Value>;

/// How the account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    #[serde(rename = "api_key")]
    ApiKey,
    #[serde(rename = "oauth")]
    OAuth,
}

impl AccountType {
    /// Stable string form, as stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::ApiKey => "api_key",
            AccountType::OAuth => "oauth",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api_key" | "api-key" | "apikey" => Ok(AccountType::ApiKey),
            "oauth" => Ok(AccountType::OAuth),
            other => Err(ValidationError::InvalidType(other.to_string())),
        }
    }
}

/// A stored credential set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AccountRecord")]
pub struct Account {
    name: String,
    email: Option<String>,
    api_key: Option<String>,
    #[serde(rename = "type")]
    kind: AccountType,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    tokens: Option<Tokens>,
    env_vars: BTreeMap<String, String>,
    tags: Vec<String>,
}

impl Account {
    /// Start building an account with the given (not yet normalized) name.
    pub fn builder(name: impl Into<String>) -> AccountBuilder {
        AccountBuilder::new(name)
    }

    /// Account name. A slug once the account has been saved or loaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn kind(&self) -> AccountType {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn tokens(&self) -> Option<&Tokens> {
        self.tokens.as_ref()
    }

    /// The `access_token` field of the token set, if it is a string.
    pub fn access_token(&self) -> Option<&str> {
        self.tokens
            .as_ref()
            .and_then(|t| t.get("access_token"))
            .and_then(|v| v.as_str())
    }

    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env_vars
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Set or replace a custom environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidEnvVar` if `key` is not a valid
    /// environment variable name.
    pub fn set_env_var(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        validate_env_key(&key)?;
        self.env_vars.insert(key, value.into());
        Ok(())
    }

    /// Remove a custom environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoCredentials` if the variable is the last
    /// piece of credential material on the account; the account is unchanged.
    pub fn remove_env_var(&mut self, key: &str) -> Result<Option<String>, ValidationError> {
        if !self.env_vars.contains_key(key) {
            return Ok(None);
        }
        if self.api_key.is_none() && self.tokens.is_none() && self.env_vars.len() == 1 {
            return Err(ValidationError::NoCredentials);
        }
        Ok(self.env_vars.remove(key))
    }

    /// Add a tag. Tags behave like a set, duplicates are ignored.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Remove a tag, returning whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        before != self.tags.len()
    }

    /// Record a use of this account.
    pub fn touch(&mut self) {
        self.last_used_at = Some(Utc::now());
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Builder for [`Account`]; `build` enforces the credential invariant.
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    name: String,
    email: Option<String>,
    api_key: Option<String>,
    kind: Option<AccountType>,
    created_at: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
    tokens: Option<Tokens>,
    env_vars: BTreeMap<String, String>,
    tags: Vec<String>,
}

impl AccountBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            api_key: None,
            kind: None,
            created_at: None,
            last_used_at: None,
            tokens: None,
            env_vars: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn tokens(mut self, tokens: Tokens) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn token(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.tokens
            .get_or_insert_with(Tokens::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Force the account type instead of inferring it.
    pub fn kind(mut self, kind: AccountType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn last_used_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_used_at = Some(at);
        self
    }

    /// Validate and build the account.
    ///
    /// Empty api keys and empty token maps count as absent. The type is
    /// inferred as `OAuth` when tokens are present without an api key, and
    /// `ApiKey` otherwise, unless set explicitly with [`AccountBuilder::kind`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoCredentials` when no api key, tokens, or
    /// environment variables are present.
    pub fn build(self) -> Result<Account, ValidationError> {
        let api_key = self.api_key.filter(|k| !k.is_empty());
        let tokens = self.tokens.filter(|t| !t.is_empty());

        if api_key.is_none() && tokens.is_none() && self.env_vars.is_empty() {
            return Err(ValidationError::NoCredentials);
        }

        let kind = self.kind.unwrap_or(if tokens.is_some() && api_key.is_none() {
            AccountType::OAuth
        } else {
            AccountType::ApiKey
        });

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Account {
            name: self.name,
            email: self.email.filter(|e| !e.is_empty()),
            api_key,
            kind,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            last_used_at: self.last_used_at,
            tokens,
            env_vars: self.env_vars,
            tags,
        })
    }
}

/// Validate an environment variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_env_key(key: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidEnvVar {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let first = key.chars().next().ok_or_else(|| invalid("empty name"))?;
    if first.is_ascii_digit() {
        return Err(invalid("cannot start with a digit"));
    }
    if let Some(ch) = key.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(invalid(&format!(
            "invalid character '{}'. Only letters, digits and underscore are allowed",
            ch
        )));
    }
    Ok(())
}

/// On-disk shape accepted when reading an account.
///
/// Lenient about missing optional fields and older timestamp formats; the
/// credential invariant is still enforced by the conversion.
#[derive(Deserialize)]
struct AccountRecord {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<AccountType>,
    #[serde(default, deserialize_with = "timestamp_opt")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_opt")]
    last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tokens: Option<Tokens>,
    #[serde(default)]
    env_vars: BTreeMap<String, String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<AccountRecord> for Account {
    type Error = ValidationError;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        let mut builder = Account::builder(record.name)
            .env_vars(record.env_vars)
            .tags(record.tags);
        if let Some(email) = record.email {
            builder = builder.email(email);
        }
        if let Some(api_key) = record.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(tokens) = record.tokens {
            builder = builder.tokens(tokens);
        }
        if let Some(kind) = record.kind {
            builder = builder.kind(kind);
        }
        if let Some(at) = record.created_at {
            builder = builder.created_at(at);
        }
        if let Some(at) = record.last_used_at {
            builder = builder.last_used_at(at);
        }
        builder.build()
    }
}

/// Parse RFC 3339, or a naive ISO-8601 timestamp interpreted as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
}

fn timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}
