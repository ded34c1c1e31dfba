//! Watcher scheduling.
//!
//! # Data Flow
//! ```text
//! Scheduler::register (config + check)
//!     → Watcher (watcher.rs, owns last_state)
//!
//! Scheduler::run:
//!     one task per watcher
//!     → cycle → sleep(delay) → cycle → ...
//!     → shutdown signal observed at the sleep
//! ```
//!
//! # Design Decisions
//! - No global tick; every watcher keeps its own cadence
//! - An in-flight cycle always completes before its task stops
//! - A task that dies is logged and does not affect the others

pub mod watcher;

pub use watcher::{CycleContext, CycleOutcome, CycleReport, Watcher};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time;

use crate::lifecycle::Shutdown;
use crate::notify::ack::lookup_timeout_for;
use crate::notify::{AckPoller, NotificationClient, ReceiptRegistry};
use crate::watcher::{Check, MessageBuilder, WatcherConfig, WatcherId};

/// Owns the configured watchers and runs them concurrently.
pub struct Scheduler {
    watchers: Vec<Watcher>,
    context: Arc<CycleContext>,
    next_id: u64,
}

impl Scheduler {
    pub fn new(notifier: NotificationClient, messages: MessageBuilder) -> Self {
        Self {
            watchers: Vec::new(),
            context: Arc::new(CycleContext { notifier, messages }),
            next_id: 0,
        }
    }

    /// Add a watcher, returning the id it will notify under.
    pub fn register(&mut self, config: WatcherConfig, check: Box<dyn Check>) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;

        let watcher = Watcher::new(id, config, check);
        tracing::info!(
            watcher = %id,
            title = %watcher.title(),
            priority = watcher.config().priority.as_i64(),
            timeout_ms = watcher.config().timeout.as_millis() as u64,
            delay_secs = watcher.config().delay.as_secs(),
            "Watcher registered"
        );
        self.watchers.push(watcher);
        id
    }

    /// Add the acknowledgment poller over this scheduler's receipts.
    pub fn register_ack_poller(&mut self, delay: Duration, timeout: Duration) -> WatcherId {
        let notifier = &self.context.notifier;
        let poller = AckPoller::new(notifier.receipts().clone(), notifier.provider())
            .with_lookup_timeout(lookup_timeout_for(timeout));
        self.register(AckPoller::watcher_config(delay, timeout), Box::new(poller))
    }

    pub fn receipts(&self) -> &ReceiptRegistry {
        self.context.notifier.receipts()
    }

    /// Ids and titles of the registered watchers.
    pub fn watchers(&self) -> Vec<(WatcherId, String)> {
        self.watchers.iter().map(|w| (w.id(), w.title())).collect()
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Run every watcher until `shutdown` fires.
    pub async fn run(self, shutdown: &Shutdown) {
        let mut tasks = JoinSet::new();
        for watcher in self.watchers {
            let context = Arc::clone(&self.context);
            let rx = shutdown.subscribe();
            tasks.spawn(drive(watcher, context, rx));
        }

        tracing::info!(
            watchers = tasks.len(),
            hostname = self.context.messages.hostname(),
            "Scheduler running"
        );

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Watcher task terminated abnormally");
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

async fn drive(mut watcher: Watcher, context: Arc<CycleContext>, mut shutdown: broadcast::Receiver<()>) {
    loop {
        watcher.cycle(&context).await;

        tokio::select! {
            _ = time::sleep(watcher.config().delay) => {}
            _ = shutdown.recv() => {
                tracing::info!(watcher = %watcher.id(), "Watcher received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
