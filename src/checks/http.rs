//! HTTP reachability check.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::checks::registry::parse_params;
use crate::config::ConfigError;
use crate::watcher::config::normalize_url;
use crate::watcher::message::format_duration;
use crate::watcher::{Check, CheckError, CheckStatus};

#[derive(Debug, Deserialize)]
struct HttpParams {
    url: String,
    url_title: Option<String>,
    #[serde(default)]
    require_success: bool,
}

/// Sends `HEAD` to a URL and passes when anything answers.
pub struct HttpCheck {
    target: String,
    label: String,
    require_success: bool,
    client: reqwest::Client,
}

impl HttpCheck {
    pub const KIND: &'static str = "http";

    /// Probe `url` (`http://` assumed when no scheme is given).
    ///
    /// With `require_success`, only 2xx and 3xx answers pass.
    pub fn new(url: &str, url_title: Option<String>, require_success: bool) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidCheck {
            kind: Self::KIND.to_string(),
            reason,
        };

        let target = normalize_url(url);
        reqwest::Url::parse(&target).map_err(|e| invalid(format!("invalid url '{}': {}", url, e)))?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("pushwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            target,
            label: url_title.unwrap_or_else(|| url.to_string()),
            require_success,
            client,
        })
    }

    pub fn from_params(params: &toml::Table) -> Result<Box<dyn Check>, ConfigError> {
        let params: HttpParams = parse_params(Self::KIND, params)?;
        Ok(Box::new(Self::new(&params.url, params.url_title, params.require_success)?))
    }
}

#[async_trait]
impl Check for HttpCheck {
    fn title(&self) -> String {
        format!("HTTPWatch({})", self.label)
    }

    async fn run(&self) -> Result<CheckStatus, CheckError> {
        let response = match self.client.head(&self.target).send().await {
            Ok(response) => response,
            Err(e) => {
                return Ok(CheckStatus::failed(format!(
                    "{} unreachable: {}",
                    self.target,
                    e.without_url()
                )))
            }
        };

        let status = response.status();
        if self.require_success && !(status.is_success() || status.is_redirection()) {
            return Ok(CheckStatus::failed(format!("{} answered HTTP {}", self.target, status)));
        }
        Ok(CheckStatus::Passed)
    }

    fn timeout_message(&self, timeout: Duration) -> String {
        format!("{} did not respond within {}", self.target, format_duration(timeout))
    }
}
