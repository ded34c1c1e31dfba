//! The check contract.
//!
//! A check is a pluggable probe that reports pass/fail. The scheduler
//! enforces the timeout by dropping the returned future, so checks must
//! stay async (no blocking I/O on the runtime thread).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::watcher::message::format_duration;

/// Result of a check that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    /// Completed and reported failure with a human-readable reason.
    Failed(String),
}

impl CheckStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        CheckStatus::Failed(reason.into())
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, CheckStatus::Passed)
    }
}

/// Unexpected errors raised while running a check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

/// A pass/fail probe executed once per cycle.
#[async_trait]
pub trait Check: Send + Sync {
    /// Title used when the watcher config does not set one.
    fn title(&self) -> String;

    /// Run the probe once.
    async fn run(&self) -> Result<CheckStatus, CheckError>;

    /// Message reported when the probe exceeds its deadline.
    fn timeout_message(&self, timeout: Duration) -> String {
        format!("{} did not complete within {}", self.title(), format_duration(timeout))
    }
}

/// Adapts an async closure into a [`Check`].
pub struct FnCheck<F> {
    title: String,
    f: F,
}

/// Wrap `f` as a check titled `title`.
pub fn from_fn<F, Fut>(title: impl Into<String>, f: F) -> FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<CheckStatus, CheckError>> + Send,
{
    FnCheck {
        title: title.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> Check for FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<CheckStatus, CheckError>> + Send,
{
    fn title(&self) -> String {
        self.title.clone()
    }

    async fn run(&self) -> Result<CheckStatus, CheckError> {
        (self.f)().await
    }
}
