//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, retry floor for emergency alerts)
//! - Validate addresses and URLs before anything binds or connects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WatchdogConfig;
use crate::watcher::WatcherConfig;

/// Semantic configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("retry interval must be at least {min}s for emergency alerts, got {actual}s")]
    RetryTooShort { min: u64, actual: u64 },

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("priority {0} out of range (-2..=2)")]
    PriorityOutOfRange(i64),

    #[error("pushover.request_timeout_secs ({request}s) must be below ack_poller.timeout_secs ({sweep}s)")]
    AckTimeoutTooShort { request: u64, sweep: u64 },

    #[error("no watchers configured")]
    NoWatchers,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("unknown log format '{0}' (expected 'pretty' or 'json')")]
    LogFormat(String),

    #[error("watcher #{index} ({kind}): {reason}")]
    Watcher {
        index: usize,
        kind: String,
        reason: String,
    },
}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.watchers.is_empty() {
        errors.push(ValidationError::NoWatchers);
    }

    if let Err(e) = url::Url::parse(&config.pushover.api_url) {
        errors.push(ValidationError::InvalidUrl {
            url: config.pushover.api_url.clone(),
            reason: e.to_string(),
        });
    }
    if config.pushover.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "pushover.request_timeout_secs" });
    }
    if config.ack_poller.delay_secs == 0 {
        errors.push(ValidationError::Zero { field: "ack_poller.delay_secs" });
    }
    if config.ack_poller.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "ack_poller.timeout_secs" });
    } else if config.pushover.request_timeout_secs >= config.ack_poller.timeout_secs {
        errors.push(ValidationError::AckTimeoutTooShort {
            request: config.pushover.request_timeout_secs,
            sweep: config.ack_poller.timeout_secs,
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }
    if !matches!(observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::LogFormat(observability.log_format.clone()));
    }

    for (index, definition) in config.watchers.iter().enumerate() {
        let watcher_error = |reason: String| ValidationError::Watcher {
            index,
            kind: definition.kind.clone(),
            reason,
        };
        match definition.settings() {
            Ok(settings) => {
                if let Err(problems) = WatcherConfig::from_settings(settings) {
                    errors.extend(problems.into_iter().map(|p| watcher_error(p.to_string())));
                }
            }
            Err(e) => errors.push(watcher_error(e.to_string())),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::WatcherDefinition;

    fn http_watcher(extra: &str) -> WatcherDefinition {
        toml::from_str(&format!("type = \"http\"\nurl = \"example.org\"\n{}", extra)).unwrap()
    }

    #[test]
    fn test_default_config_needs_watchers() {
        let errors = validate_config(&WatchdogConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoWatchers]);
    }

    #[test]
    fn test_valid_config() {
        let mut config = WatchdogConfig::default();
        config.watchers.push(http_watcher("priority = 2"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = WatchdogConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();
        config.observability.log_format = "xml".into();
        config.ack_poller.delay_secs = 0;
        config.watchers.push(http_watcher("priority = 2\nretry_secs = 10"));
        config.watchers.push(http_watcher("delay_secs = 0"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::MetricsAddress("nowhere".into())));
        assert!(errors.contains(&ValidationError::LogFormat("xml".into())));
        assert!(errors.contains(&ValidationError::Watcher {
            index: 1,
            kind: "http".into(),
            reason: "delay must be greater than zero".into(),
        }));
    }

    #[test]
    fn test_request_timeout_must_fit_ack_sweep() {
        let mut config = WatchdogConfig::default();
        config.watchers.push(http_watcher(""));
        config.pushover.request_timeout_secs = 30;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::AckTimeoutTooShort { request: 30, sweep: 20 }]
        );

        config.ack_poller.timeout_secs = 31;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_priority_reported_per_watcher() {
        let mut config = WatchdogConfig::default();
        config.watchers.push(http_watcher("priority = 5"));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::Watcher { index: 0, .. }));
    }
}
