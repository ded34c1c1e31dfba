//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::notify::ack::{DEFAULT_ACK_DELAY, DEFAULT_ACK_TIMEOUT};
use crate::notify::provider::DEFAULT_API_URL;
use crate::watcher::WatcherSettings;

/// Root configuration for the watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Host identity used in alert messages (resolved when absent).
    pub hostname: Option<String>,

    /// Push provider settings.
    pub pushover: PushoverConfig,

    /// Acknowledgment poller cadence.
    pub ack_poller: AckPollerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Watcher definitions, one per monitored check.
    pub watchers: Vec<WatcherDefinition>,
}

/// Push provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PushoverConfig {
    /// API base URL.
    pub api_url: String,

    /// Timeout for each provider request in seconds.
    pub request_timeout_secs: u64,

    /// Device name applied to every alert.
    pub device: Option<String>,

    /// TOML file holding `user_token` and `app_token`.
    pub credentials_path: Option<String>,

    pub user_token: Option<String>,

    pub app_token: Option<String>,
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            device: None,
            credentials_path: None,
            user_token: None,
            app_token: None,
        }
    }
}

impl PushoverConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Tokens stay out of debug output.
impl fmt::Debug for PushoverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverConfig")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("device", &self.device)
            .field("credentials_path", &self.credentials_path)
            .field("user_token", &self.user_token.as_ref().map(|_| "<redacted>"))
            .field("app_token", &self.app_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Acknowledgment poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AckPollerConfig {
    /// Interval between sweeps in seconds.
    pub delay_secs: u64,

    /// Budget for one sweep in seconds.
    pub timeout_secs: u64,
}

impl Default for AckPollerConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_ACK_DELAY.as_secs(),
            timeout_secs: DEFAULT_ACK_TIMEOUT.as_secs(),
        }
    }
}

impl AckPollerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One `[[watchers]]` entry: a check type plus its parameters.
///
/// Common watcher keys and type-specific keys share one table; each side
/// reads the keys it knows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherDefinition {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub params: toml::Table,
}

impl WatcherDefinition {
    /// The common watcher keys of this entry.
    pub fn settings(&self) -> Result<WatcherSettings, toml::de::Error> {
        toml::Value::Table(self.params.clone()).try_into()
    }
}
