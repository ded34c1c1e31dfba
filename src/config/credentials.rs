//! Provider credentials.
//!
//! # Security Constraints
//! - Tokens are read once at startup and never logged
//! - Environment overrides file, file overrides inline config

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::loader::ConfigError;
use crate::config::schema::PushoverConfig;

/// Environment variable holding the user token.
pub const USER_TOKEN_ENV: &str = "PUSHWATCH_USER_TOKEN";
/// Environment variable holding the application token.
pub const APP_TOKEN_ENV: &str = "PUSHWATCH_APP_TOKEN";

/// User and application tokens for the push provider.
#[derive(Clone)]
pub struct Credentials {
    user_token: String,
    app_token: String,
}

impl Credentials {
    pub fn new(user_token: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            user_token: user_token.into(),
            app_token: app_token.into(),
        }
    }

    pub fn user_token(&self) -> &str {
        &self.user_token
    }

    pub fn app_token(&self) -> &str {
        &self.app_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// Token pair from a single source; either half may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct TokenSource {
    #[serde(alias = "pushover_user_token")]
    pub user_token: Option<String>,

    #[serde(alias = "pushover_app_token")]
    pub app_token: Option<String>,
}

impl TokenSource {
    fn from_env() -> Self {
        Self {
            user_token: std::env::var(USER_TOKEN_ENV).ok(),
            app_token: std::env::var(APP_TOKEN_ENV).ok(),
        }
    }
}

/// Resolve credentials from the environment, the credentials file and the
/// inline config, in that order of precedence.
pub fn load_credentials(config: &PushoverConfig) -> Result<Credentials, ConfigError> {
    let file = match &config.credentials_path {
        Some(path) => Some(read_token_file(&expand_home(path))?),
        None => None,
    };
    let inline = TokenSource {
        user_token: config.user_token.clone(),
        app_token: config.app_token.clone(),
    };

    let mut sources = vec![TokenSource::from_env()];
    sources.extend(file);
    sources.push(inline);
    resolve(&sources)
}

/// Pick each token from the first source that has a non-empty value.
pub fn resolve(sources: &[TokenSource]) -> Result<Credentials, ConfigError> {
    let user_token = first_token(sources.iter().map(|s| s.user_token.as_deref()))
        .ok_or(ConfigError::MissingCredential("user_token"))?;
    let app_token = first_token(sources.iter().map(|s| s.app_token.as_deref()))
        .ok_or(ConfigError::MissingCredential("app_token"))?;
    Ok(Credentials::new(user_token, app_token))
}

fn first_token<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

fn read_token_file(path: &Path) -> Result<TokenSource, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
