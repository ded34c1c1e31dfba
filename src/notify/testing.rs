//! In-memory push provider for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::notify::provider::{PushProvider, ReceiptStatus, SendResponse};
use crate::notify::receipt::ReceiptId;
use crate::notify::request::NotificationRequest;
use crate::notify::NotifyError;

#[derive(Default)]
pub(crate) struct MockProvider {
    sent: Mutex<Vec<NotificationRequest>>,
    next_receipt: AtomicU64,
    fail_sends: AtomicBool,
    statuses: Mutex<HashMap<ReceiptId, ReceiptStatus>>,
    broken_receipts: Mutex<HashSet<ReceiptId>>,
    stalled_receipts: Mutex<HashSet<ReceiptId>>,
    queries: Mutex<Vec<ReceiptId>>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sends(&self) -> usize {
        self.sent.lock().len()
    }

    pub(crate) fn sent_requests(&self) -> Vec<NotificationRequest> {
        self.sent.lock().clone()
    }

    pub(crate) fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_status(&self, id: &str, status: ReceiptStatus) {
        self.statuses.lock().insert(ReceiptId(id.into()), status);
    }

    pub(crate) fn break_receipt(&self, id: &str) {
        self.broken_receipts.lock().insert(ReceiptId(id.into()));
    }

    /// Lookups of `id` never answer in any reasonable time.
    pub(crate) fn stall_receipt(&self, id: &str) {
        self.stalled_receipts.lock().insert(ReceiptId(id.into()));
    }

    pub(crate) fn queries(&self) -> Vec<ReceiptId> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl PushProvider for MockProvider {
    async fn send(&self, request: &NotificationRequest) -> Result<SendResponse, NotifyError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 500,
                detail: "scripted failure".into(),
            });
        }
        self.sent.lock().push(request.clone());
        let n = self.next_receipt.fetch_add(1, Ordering::SeqCst);
        let receipt = request
            .priority
            .requires_ack()
            .then(|| ReceiptId(format!("rcpt-{}", n)));
        Ok(SendResponse {
            request_id: Some(format!("req-{}", n)),
            receipt,
        })
    }

    async fn receipt_status(&self, receipt: &ReceiptId) -> Result<ReceiptStatus, NotifyError> {
        self.queries.lock().push(receipt.clone());
        let stalled = self.stalled_receipts.lock().contains(receipt);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.broken_receipts.lock().contains(receipt) {
            return Err(NotifyError::Rejected {
                status: 404,
                detail: "receipt not found".into(),
            });
        }
        Ok(self.statuses.lock().get(receipt).cloned().unwrap_or_default())
    }
}
