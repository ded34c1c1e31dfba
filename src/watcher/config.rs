//! Per-watcher configuration.
//!
//! `WatcherSettings` is the loosely-typed form read from the config file;
//! `WatcherConfig` is the validated, immutable form the scheduler runs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;

/// Default check timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default interval between cycles.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);
/// Default provider retry interval for emergency alerts.
pub const DEFAULT_RETRY: Duration = Duration::from_secs(30 * 60);
/// Default time the provider keeps retrying an emergency alert.
pub const DEFAULT_EXPIRE: Duration = Duration::from_secs(24 * 3600);
/// Smallest retry interval the provider accepts.
pub const MIN_RETRY: Duration = Duration::from_secs(30);

/// Notification priority as understood by the push provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    /// Re-delivered until acknowledged; produces a receipt.
    Emergency,
}

impl Priority {
    pub fn as_i64(self) -> i64 {
        match self {
            Priority::Lowest => -2,
            Priority::Low => -1,
            Priority::Normal => 0,
            Priority::High => 1,
            Priority::Emergency => 2,
        }
    }

    /// Whether alerts at this priority wait for a human acknowledgment.
    pub fn requires_ack(self) -> bool {
        self == Priority::Emergency
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Priority::Lowest),
            -1 => Ok(Priority::Low),
            0 => Ok(Priority::Normal),
            1 => Ok(Priority::High),
            2 => Ok(Priority::Emergency),
            other => Err(ValidationError::PriorityOutOfRange(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> Self {
        p.as_i64()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// Alert sounds offered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    Pushover,
    Bike,
    Bugle,
    Cashregister,
    Classical,
    Cosmic,
    Falling,
    Gamelan,
    Incoming,
    Intermission,
    Magic,
    Mechanical,
    Pianobar,
    Siren,
    Spacealarm,
    Tugboat,
    Alien,
    Climb,
    Persistent,
    Echo,
    Updown,
    Vibrate,
    None,
}

impl Sound {
    pub fn as_str(self) -> &'static str {
        match self {
            Sound::Pushover => "pushover",
            Sound::Bike => "bike",
            Sound::Bugle => "bugle",
            Sound::Cashregister => "cashregister",
            Sound::Classical => "classical",
            Sound::Cosmic => "cosmic",
            Sound::Falling => "falling",
            Sound::Gamelan => "gamelan",
            Sound::Incoming => "incoming",
            Sound::Intermission => "intermission",
            Sound::Magic => "magic",
            Sound::Mechanical => "mechanical",
            Sound::Pianobar => "pianobar",
            Sound::Siren => "siren",
            Sound::Spacealarm => "spacealarm",
            Sound::Tugboat => "tugboat",
            Sound::Alien => "alien",
            Sound::Climb => "climb",
            Sound::Persistent => "persistent",
            Sound::Echo => "echo",
            Sound::Updown => "updown",
            Sound::Vibrate => "vibrate",
            Sound::None => "none",
        }
    }
}

/// Watcher keys shared by every check type, as written in the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Explicit title; derived from the check when absent.
    pub title: Option<String>,

    /// Check timeout in milliseconds (default: 3000).
    pub timeout_ms: Option<u64>,

    /// Delay between cycles in seconds (default: 60).
    pub delay_secs: Option<u64>,

    /// Notification priority (-2..=2, default: 0).
    pub priority: Option<Priority>,

    /// Provider retry interval for emergency alerts in seconds (default: 1800).
    pub retry_secs: Option<u64>,

    /// Provider expiry for emergency alerts in seconds (default: 86400).
    pub expire_secs: Option<u64>,

    pub sound: Option<Sound>,

    /// Supplementary link attached to the notification.
    pub url: Option<String>,

    pub url_title: Option<String>,
}

/// Validated, immutable configuration of one watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    pub title: Option<String>,
    pub timeout: Duration,
    pub delay: Duration,
    pub priority: Priority,
    pub retry: Duration,
    pub expire: Duration,
    pub sound: Option<Sound>,
    pub url: Option<String>,
    pub url_title: Option<String>,
    /// Failures of a muted watcher are logged but never notified.
    pub muted: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            title: None,
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            priority: Priority::Normal,
            retry: DEFAULT_RETRY,
            expire: DEFAULT_EXPIRE,
            sound: None,
            url: None,
            url_title: None,
            muted: false,
        }
    }
}

impl WatcherConfig {
    /// Build a config from file settings, applying defaults and validating.
    pub fn from_settings(settings: WatcherSettings) -> Result<Self, Vec<ValidationError>> {
        let defaults = Self::default();
        let config = Self {
            title: settings.title,
            timeout: settings.timeout_ms.map(Duration::from_millis).unwrap_or(defaults.timeout),
            delay: settings.delay_secs.map(Duration::from_secs).unwrap_or(defaults.delay),
            priority: settings.priority.unwrap_or(defaults.priority),
            retry: settings.retry_secs.map(Duration::from_secs).unwrap_or(defaults.retry),
            expire: settings.expire_secs.map(Duration::from_secs).unwrap_or(defaults.expire),
            sound: settings.sound,
            url: settings.url,
            url_title: settings.url_title,
            muted: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.timeout.is_zero() {
            errors.push(ValidationError::Zero { field: "timeout" });
        }
        if self.delay.is_zero() {
            errors.push(ValidationError::Zero { field: "delay" });
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push(ValidationError::EmptyTitle);
        }
        if self.priority.requires_ack() {
            if self.retry < MIN_RETRY {
                errors.push(ValidationError::RetryTooShort {
                    min: MIN_RETRY.as_secs(),
                    actual: self.retry.as_secs(),
                });
            }
            if self.expire.is_zero() {
                errors.push(ValidationError::Zero { field: "expire" });
            }
        }
        if let Some(url) = &self.url {
            if let Err(e) = url::Url::parse(&normalize_url(url)) {
                errors.push(ValidationError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Prefix `http://` onto bare host names.
pub fn normalize_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}
