//! Acknowledgment polling.
//!
//! Runs as an ordinary watcher whose check prunes settled receipts. It
//! always passes; a lookup failure only keeps that one receipt pending.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time;

use crate::notify::provider::PushProvider;
use crate::notify::receipt::ReceiptRegistry;
use crate::notify::NotifyError;
use crate::observability::metrics;
use crate::watcher::{Check, CheckError, CheckStatus, WatcherConfig};

/// Default interval between acknowledgment sweeps.
pub const DEFAULT_ACK_DELAY: Duration = Duration::from_secs(30);
/// Default budget for one sweep.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(20);

/// Budget for a single receipt lookup within a sweep of `sweep` length.
///
/// Kept below the sweep budget so a stalled lookup fails on its own before
/// the sweep as a whole times out.
pub fn lookup_timeout_for(sweep: Duration) -> Duration {
    sweep * 3 / 4
}

/// Synthetic check reconciling receipts with the provider.
pub struct AckPoller {
    receipts: ReceiptRegistry,
    provider: Arc<dyn PushProvider>,
    lookup_timeout: Duration,
}

impl AckPoller {
    pub fn new(receipts: ReceiptRegistry, provider: Arc<dyn PushProvider>) -> Self {
        Self {
            receipts,
            provider,
            lookup_timeout: lookup_timeout_for(DEFAULT_ACK_TIMEOUT),
        }
    }

    /// Give up on a single receipt lookup after `timeout`.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Watcher config for the poller: never notifies.
    pub fn watcher_config(delay: Duration, timeout: Duration) -> WatcherConfig {
        WatcherConfig {
            delay,
            timeout,
            muted: true,
            ..Default::default()
        }
    }

    /// Query every pending receipt once and retire the settled ones.
    ///
    /// Receipts are retired as their lookups complete, so a slow or failing
    /// lookup never holds back the others. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let pending = self.receipts.snapshot();
        if pending.is_empty() {
            return 0;
        }

        let mut lookups: FuturesUnordered<_> = pending
            .iter()
            .map(|receipt| async move {
                let result = match time::timeout(self.lookup_timeout, self.provider.receipt_status(&receipt.id)).await {
                    Ok(result) => result,
                    Err(_) => Err(NotifyError::Timeout(self.lookup_timeout)),
                };
                (receipt, result)
            })
            .collect();

        let mut removed = 0;
        while let Some((receipt, result)) = lookups.next().await {
            match result {
                Ok(status) if status.is_settled() => {
                    let retired = self.receipts.remove_acknowledged(|r| r.id == receipt.id);
                    tracing::info!(
                        owner = %receipt.owner,
                        receipt = %receipt.id,
                        acknowledged = status.acknowledged,
                        expired = status.expired,
                        acknowledged_by = status.acknowledged_by.as_deref().unwrap_or_default(),
                        age_secs = receipt.issued_at.elapsed().unwrap_or_default().as_secs(),
                        "Receipt settled"
                    );
                    metrics::record_receipts_retired(retired);
                    removed += retired;
                }
                Ok(_) => {
                    tracing::debug!(owner = %receipt.owner, receipt = %receipt.id, "Receipt still pending");
                }
                Err(e) => {
                    tracing::warn!(
                        owner = %receipt.owner,
                        receipt = %receipt.id,
                        error = %e,
                        "Failed to query receipt status"
                    );
                }
            }
        }

        metrics::record_pending_receipts(self.receipts.len());
        removed
    }
}

#[async_trait]
impl Check for AckPoller {
    fn title(&self) -> String {
        format!("AckPoller({} pending)", self.receipts.len())
    }

    async fn run(&self) -> Result<CheckStatus, CheckError> {
        self.sweep().await;
        Ok(CheckStatus::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::provider::ReceiptStatus;
    use crate::notify::receipt::{Receipt, ReceiptId};
    use crate::notify::testing::MockProvider;
    use crate::notify::NotificationClient;
    use crate::resilience::{run_bounded, Bounded};
    use crate::scheduler::{CycleContext, CycleOutcome, Watcher};
    use crate::watcher::{MessageBuilder, WatcherId};

    fn registry_with(ids: &[&str]) -> ReceiptRegistry {
        let registry = ReceiptRegistry::new();
        for (i, id) in ids.iter().enumerate() {
            registry.insert(Receipt::new(ReceiptId((*id).into()), WatcherId(i as u64)));
        }
        registry
    }

    #[tokio::test]
    async fn test_removes_only_acknowledged() {
        let provider = Arc::new(MockProvider::new());
        provider.set_status("r1", ReceiptStatus { acknowledged: true, ..Default::default() });
        provider.set_status("r2", ReceiptStatus::default());
        let registry = registry_with(&["r1", "r2"]);

        let poller = AckPoller::new(registry.clone(), provider.clone());
        assert_eq!(poller.run().await.unwrap(), CheckStatus::Passed);

        let left = registry.snapshot();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, ReceiptId("r2".into()));
    }

    #[tokio::test]
    async fn test_expired_receipts_retired() {
        let provider = Arc::new(MockProvider::new());
        provider.set_status("r1", ReceiptStatus { expired: true, ..Default::default() });
        let registry = registry_with(&["r1"]);

        let removed = AckPoller::new(registry.clone(), provider).sweep().await;
        assert_eq!(removed, 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_isolated() {
        let provider = Arc::new(MockProvider::new());
        provider.break_receipt("r1");
        provider.set_status("r2", ReceiptStatus { acknowledged: true, ..Default::default() });
        provider.set_status("r3", ReceiptStatus { acknowledged: true, ..Default::default() });
        let registry = registry_with(&["r1", "r2", "r3"]);

        let poller = AckPoller::new(registry.clone(), provider.clone());
        assert_eq!(poller.run().await.unwrap(), CheckStatus::Passed);

        assert_eq!(provider.queries().len(), 3);
        let left = registry.snapshot();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, ReceiptId("r1".into()));
    }

    #[tokio::test]
    async fn test_stalled_lookup_does_not_block_pruning() {
        let provider = Arc::new(MockProvider::new());
        provider.stall_receipt("r1");
        provider.set_status("r2", ReceiptStatus { acknowledged: true, ..Default::default() });
        let registry = registry_with(&["r1", "r2"]);

        let sweep_budget = Duration::from_millis(200);
        let poller = AckPoller::new(registry.clone(), provider.clone())
            .with_lookup_timeout(lookup_timeout_for(sweep_budget));
        let mut watcher = Watcher::new(
            WatcherId(99),
            AckPoller::watcher_config(DEFAULT_ACK_DELAY, sweep_budget),
            Box::new(poller),
        );
        let ctx = CycleContext {
            notifier: NotificationClient::new(provider.clone(), registry.clone()),
            messages: MessageBuilder::new("h"),
        };

        let report = watcher.cycle(&ctx).await;
        assert_eq!(report.outcome, CycleOutcome::Passed);
        assert!(report.notification.is_none());

        let left: Vec<ReceiptId> = registry.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(left, vec![ReceiptId("r1".into())]);
    }

    #[tokio::test]
    async fn test_settled_receipts_retired_before_sweep_finishes() {
        let provider = Arc::new(MockProvider::new());
        provider.stall_receipt("r1");
        provider.set_status("r2", ReceiptStatus { acknowledged: true, ..Default::default() });
        let registry = registry_with(&["r1", "r2"]);

        let poller = AckPoller::new(registry.clone(), provider.clone())
            .with_lookup_timeout(Duration::from_secs(30));
        let result = run_bounded(Duration::from_millis(200), poller.sweep()).await;
        assert_eq!(result, Bounded::TimedOut);

        let left: Vec<ReceiptId> = registry.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(left, vec![ReceiptId("r1".into())]);
    }

    #[test]
    fn test_lookup_timeout_below_sweep_budget() {
        assert_eq!(lookup_timeout_for(Duration::from_secs(20)), Duration::from_secs(15));
        assert!(lookup_timeout_for(DEFAULT_ACK_TIMEOUT) < DEFAULT_ACK_TIMEOUT);
    }

    #[tokio::test]
    async fn test_title_reports_pending_count() {
        let provider = Arc::new(MockProvider::new());
        let registry = registry_with(&["a", "b"]);
        let poller = AckPoller::new(registry.clone(), provider.clone());
        assert_eq!(poller.title(), "AckPoller(2 pending)");

        registry.remove_acknowledged(|_| true);
        assert_eq!(poller.title(), "AckPoller(0 pending)");
        assert_eq!(poller.sweep().await, 0);
        assert!(provider.queries().is_empty());
    }

    #[test]
    fn test_poller_config_is_muted() {
        let config = AckPoller::watcher_config(DEFAULT_ACK_DELAY, DEFAULT_ACK_TIMEOUT);
        assert!(config.muted);
        assert_eq!(config.delay, Duration::from_secs(30));
    }
}
