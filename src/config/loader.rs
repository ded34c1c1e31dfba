//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::WatchdogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("missing credential '{0}'")]
    MissingCredential(&'static str),

    #[error("unknown check type '{0}'")]
    UnknownCheckType(String),

    #[error("invalid parameters for check '{kind}': {reason}")]
    InvalidCheck { kind: String, reason: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WatchdogConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<WatchdogConfig, ConfigError> {
    let config: WatchdogConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        hostname = "web-1"

        [pushover]
        device = "phone"

        [ack_poller]
        delay_secs = 15

        [[watchers]]
        type = "http"
        url = "example.org"
        timeout_ms = 10000
        priority = 2
        url_title = "Example"
        sound = "spacealarm"

        [[watchers]]
        type = "memory"
        title = "Mem"
        max_mem = 90
        max_swap = 20
    "#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.hostname.as_deref(), Some("web-1"));
        assert_eq!(config.pushover.device.as_deref(), Some("phone"));
        assert_eq!(config.ack_poller.delay_secs, 15);
        assert_eq!(config.watchers.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/pushwatch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/pushwatch.toml"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[[watchers]\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_errors_joined() {
        let err = parse_config("[observability]\nlog_format = \"xml\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: no watchers configured, unknown log format 'xml' (expected 'pretty' or 'json')"
        );
    }
}
