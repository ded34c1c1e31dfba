//! One watcher and its cycle.
//!
//! # Cycle
//! ```text
//! run check under deadline
//!     → classify: passed / failed / timed out
//!     → failed and alert due: submit through NotificationClient
//!     → record last_state
//! ```
//!
//! # Alert policy
//! - Normal priorities alert once per failure episode; an episode ends on
//!   the next passing cycle. A failed delivery keeps the alert due.
//! - Emergency priority submits on every failing cycle; the receipt gate
//!   suppresses while an earlier alert awaits acknowledgment.

use std::time::Instant;

use crate::notify::{Delivery, NotificationClient, NotificationRequest, NotifyError};
use crate::observability::metrics;
use crate::resilience::{run_bounded, Bounded};
use crate::watcher::{Check, CheckStatus, MessageBuilder, WatcherConfig, WatcherId};

/// Shared, read-only inputs to every cycle.
pub struct CycleContext {
    pub notifier: NotificationClient,
    pub messages: MessageBuilder,
}

/// Classified result of one check run. Failure variants carry the
/// composed notification body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Passed,
    Failed(String),
    TimedOut(String),
}

impl CycleOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, CycleOutcome::Passed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CycleOutcome::Passed => None,
            CycleOutcome::Failed(m) | CycleOutcome::TimedOut(m) => Some(m),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Passed => "passed",
            CycleOutcome::Failed(_) => "failed",
            CycleOutcome::TimedOut(_) => "timeout",
        }
    }
}

/// What one cycle did.
#[derive(Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Present when a notification was attempted.
    pub notification: Option<Result<Delivery, NotifyError>>,
}

/// A check bound to its config and last-known state.
///
/// Owned by exactly one task; nothing here is shared.
pub struct Watcher {
    id: WatcherId,
    config: WatcherConfig,
    check: Box<dyn Check>,
    last_state: bool,
    alert_due: bool,
}

impl Watcher {
    pub fn new(id: WatcherId, config: WatcherConfig, check: Box<dyn Check>) -> Self {
        Self {
            id,
            config,
            check,
            last_state: true,
            alert_due: true,
        }
    }

    pub fn id(&self) -> WatcherId {
        self.id
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Whether the most recent cycle passed. True before the first cycle.
    pub fn last_state(&self) -> bool {
        self.last_state
    }

    /// Explicit title, or the one the check derives.
    pub fn title(&self) -> String {
        self.config
            .title
            .clone()
            .unwrap_or_else(|| self.check.title())
    }

    async fn probe(&self, messages: &MessageBuilder) -> CycleOutcome {
        match run_bounded(self.config.timeout, self.check.run()).await {
            Bounded::Completed(Ok(CheckStatus::Passed)) => CycleOutcome::Passed,
            Bounded::Completed(Ok(CheckStatus::Failed(reason))) => {
                CycleOutcome::Failed(messages.failure(&reason))
            }
            Bounded::Completed(Err(e)) => {
                tracing::warn!(watcher = %self.id, error = %e, "Check raised an error");
                CycleOutcome::Failed(messages.error(&e.to_string()))
            }
            Bounded::Panicked(panic) => {
                tracing::error!(watcher = %self.id, panic = %panic, "Check panicked");
                CycleOutcome::Failed(messages.error(&format!("check panicked: {}", panic)))
            }
            Bounded::TimedOut => {
                CycleOutcome::TimedOut(messages.timeout(&self.check.timeout_message(self.config.timeout)))
            }
        }
    }

    fn should_notify(&self) -> bool {
        !self.config.muted && (self.config.priority.requires_ack() || self.alert_due)
    }

    /// Run one cycle: check, maybe notify, record state.
    pub async fn cycle(&mut self, ctx: &CycleContext) -> CycleReport {
        let title = self.title();
        let started = Instant::now();
        let outcome = self.probe(&ctx.messages).await;
        metrics::record_check(self.id, outcome.label(), started.elapsed());

        let passed = outcome.is_passed();
        let mut notification = None;

        if let Some(message) = outcome.message() {
            if self.last_state {
                tracing::warn!(watcher = %self.id, title = %title, message = %message, "Check started failing");
            } else {
                tracing::info!(watcher = %self.id, title = %title, message = %message, "Check still failing");
            }

            if self.should_notify() {
                let request = NotificationRequest::for_watcher(&self.config, &title, message.to_string());
                let result = ctx.notifier.submit(self.id, request).await;
                self.alert_due = result.is_err();
                notification = Some(result);
            } else if !self.config.muted {
                tracing::info!(watcher = %self.id, title = %title, "Not sending notification, already done");
            }
        } else {
            if !self.last_state {
                tracing::info!(watcher = %self.id, title = %title, "Check recovered");
            }
            tracing::debug!(
                watcher = %self.id,
                title = %title,
                delay_secs = self.config.delay.as_secs(),
                "Check passed"
            );
            self.alert_due = true;
        }

        self.last_state = passed;
        CycleReport { outcome, notification }
    }
}
