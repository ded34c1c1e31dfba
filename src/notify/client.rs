//! Notification dispatch with the pending-acknowledgment gate.

use std::sync::Arc;

use crate::notify::provider::PushProvider;
use crate::notify::receipt::{ReceiptId, ReceiptRegistry};
use crate::notify::request::NotificationRequest;
use crate::notify::NotifyError;
use crate::observability::metrics;
use crate::watcher::WatcherId;

/// What happened to a submitted alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered; no acknowledgment expected.
    Sent,
    /// Delivered at emergency priority; tracked until acknowledged.
    Tracked(ReceiptId),
    /// Not sent because an earlier alert from the same watcher is pending.
    Suppressed,
}

/// Sends alerts and owns the receipt registry they feed.
#[derive(Clone)]
pub struct NotificationClient {
    provider: Arc<dyn PushProvider>,
    receipts: ReceiptRegistry,
    device: Option<String>,
}

impl NotificationClient {
    pub fn new(provider: Arc<dyn PushProvider>, receipts: ReceiptRegistry) -> Self {
        Self {
            provider,
            receipts,
            device: None,
        }
    }

    /// Target device applied to requests that do not name one.
    pub fn with_device(mut self, device: Option<String>) -> Self {
        self.device = device;
        self
    }

    pub fn provider(&self) -> Arc<dyn PushProvider> {
        Arc::clone(&self.provider)
    }

    pub fn receipts(&self) -> &ReceiptRegistry {
        &self.receipts
    }

    /// Submit an alert on behalf of `owner`.
    ///
    /// Suppressed while `owner` has a pending receipt or another send in
    /// flight. Delivery failures create no receipt and are returned to the
    /// caller; the next failing cycle tries again.
    pub async fn submit(&self, owner: WatcherId, request: NotificationRequest) -> Result<Delivery, NotifyError> {
        let Some(reservation) = self.receipts.reserve(owner) else {
            tracing::info!(
                target: "pushwatch::audit",
                owner = %owner,
                title = request.title.as_deref().unwrap_or_default(),
                "Not sending notification, acknowledgment still pending"
            );
            metrics::record_notification("suppressed");
            return Ok(Delivery::Suppressed);
        };

        let request = request.with_device(self.device.clone());
        tracing::info!(
            target: "pushwatch::audit",
            owner = %owner,
            title = request.title.as_deref().unwrap_or_default(),
            message = %request.message,
            priority = request.priority.as_i64(),
            url = request.url.as_deref().unwrap_or_default(),
            url_title = request.url_title.as_deref().unwrap_or_default(),
            sound = request.sound.map(|s| s.as_str()).unwrap_or_default(),
            device = request.device.as_deref().unwrap_or_default(),
            retry_secs = request.retry.map(|d| d.as_secs()).unwrap_or_default(),
            expire_secs = request.expire.map(|d| d.as_secs()).unwrap_or_default(),
            timestamp = request.timestamp.unwrap_or_default(),
            "Submitting notification"
        );

        let response = match self.provider.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(owner = %owner, error = %e, "Notification delivery failed");
                metrics::record_notification("failed");
                return Err(e);
            }
        };
        metrics::record_notification("sent");

        if !request.priority.requires_ack() {
            return Ok(Delivery::Sent);
        }

        match response.receipt {
            Some(id) => {
                if !reservation.commit(id.clone()) {
                    tracing::error!(owner = %owner, receipt = %id, "Provider reissued a receipt that is already tracked");
                    return Err(NotifyError::DuplicateReceipt(id));
                }
                metrics::record_pending_receipts(self.receipts.len());
                tracing::info!(owner = %owner, receipt = %id, "Emergency alert awaiting acknowledgment");
                Ok(Delivery::Tracked(id))
            }
            None => {
                tracing::warn!(owner = %owner, "Emergency alert delivered without a receipt");
                Err(NotifyError::MissingReceipt)
            }
        }
    }
}
