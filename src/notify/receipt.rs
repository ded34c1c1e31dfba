//! Pending emergency-alert receipts.
//!
//! # Responsibilities
//! - Hold every receipt still awaiting acknowledgment
//! - Gate sends per watcher while a receipt or a send is outstanding
//! - Retire receipts the ack poller reports as settled
//!
//! # Design Decisions
//! - One mutex guards receipts and in-flight owners together, so the
//!   existence check and the insert it guards are a single critical section
//! - The lock is never held across I/O; sends hold a `Reservation` instead
//! - Retirement matches on receipt id, never on owner

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::watcher::WatcherId;

/// Opaque receipt token issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptId(pub String);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One outstanding emergency alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub id: ReceiptId,
    /// Watcher that raised the alert; used for dedup lookups only.
    pub owner: WatcherId,
    pub issued_at: SystemTime,
}

impl Receipt {
    pub fn new(id: ReceiptId, owner: WatcherId) -> Self {
        Self {
            id,
            owner,
            issued_at: SystemTime::now(),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    receipts: Vec<Receipt>,
    in_flight: HashSet<WatcherId>,
}

impl RegistryState {
    fn exists_for(&self, owner: WatcherId) -> bool {
        self.receipts.iter().any(|r| r.owner == owner)
    }

    fn insert(&mut self, receipt: Receipt) -> bool {
        if self.receipts.iter().any(|r| r.id == receipt.id) {
            return false;
        }
        self.receipts.push(receipt);
        true
    }
}

/// Shared, ordered store of pending receipts.
#[derive(Debug, Clone, Default)]
pub struct ReceiptRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl ReceiptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a receipt. Returns false if its id is already present.
    pub fn insert(&self, receipt: Receipt) -> bool {
        self.inner.lock().insert(receipt)
    }

    /// Whether a receipt raised by `owner` is still pending.
    pub fn exists_for(&self, owner: WatcherId) -> bool {
        self.inner.lock().exists_for(owner)
    }

    /// Remove every receipt matching `predicate`, returning how many went.
    pub fn remove_acknowledged<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&Receipt) -> bool,
    {
        let mut state = self.inner.lock();
        let before = state.receipts.len();
        state.receipts.retain(|r| !predicate(r));
        before - state.receipts.len()
    }

    /// Copy of the pending receipts in insertion order.
    pub fn snapshot(&self) -> Vec<Receipt> {
        self.inner.lock().receipts.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim the right to send for `owner`.
    ///
    /// Returns `None` while a receipt from `owner` is pending or another
    /// send for `owner` holds a reservation.
    pub fn reserve(&self, owner: WatcherId) -> Option<Reservation> {
        let mut state = self.inner.lock();
        if state.exists_for(owner) || state.in_flight.contains(&owner) {
            return None;
        }
        state.in_flight.insert(owner);
        Some(Reservation {
            registry: self.clone(),
            owner,
        })
    }
}

/// Exclusive send slot for one watcher. Released on drop.
#[derive(Debug)]
pub struct Reservation {
    registry: ReceiptRegistry,
    owner: WatcherId,
}

impl Reservation {
    pub fn owner(&self) -> WatcherId {
        self.owner
    }

    /// Record the receipt produced by the send and release the slot.
    pub fn commit(self, id: ReceiptId) -> bool {
        let mut state = self.registry.inner.lock();
        state.in_flight.remove(&self.owner);
        state.insert(Receipt::new(id, self.owner))
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.registry.inner.lock().in_flight.remove(&self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(id: &str, owner: u64) -> Receipt {
        Receipt::new(ReceiptId(id.into()), WatcherId(owner))
    }

    #[test]
    fn test_receipt_records_issue_time() {
        let before = SystemTime::now();
        let r = receipt("a", 1);
        assert!(r.issued_at >= before);
        assert!(r.issued_at <= SystemTime::now());
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = ReceiptRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert(receipt("r1", 1)));
        assert!(!registry.insert(receipt("r1", 1)), "duplicate id rejected");
        assert!(registry.exists_for(WatcherId(1)));
        assert!(!registry.exists_for(WatcherId(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_acknowledged_counts() {
        let registry = ReceiptRegistry::new();
        registry.insert(receipt("r1", 1));
        registry.insert(receipt("r2", 2));
        registry.insert(receipt("r3", 3));

        let removed = registry.remove_acknowledged(|r| r.id.0 != "r2");
        assert_eq!(removed, 2);

        let left = registry.snapshot();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, ReceiptId("r2".into()));
    }

    #[test]
    fn test_reservation_blocks_second_send() {
        let registry = ReceiptRegistry::new();
        let first = registry.reserve(WatcherId(7)).expect("first reservation");
        assert!(registry.reserve(WatcherId(7)).is_none());
        assert!(registry.reserve(WatcherId(8)).is_some());

        drop(first);
        assert!(registry.reserve(WatcherId(7)).is_some(), "released on drop");
    }

    #[test]
    fn test_commit_inserts_and_gates() {
        let registry = ReceiptRegistry::new();
        let reservation = registry.reserve(WatcherId(3)).unwrap();
        assert_eq!(reservation.owner(), WatcherId(3));
        assert!(reservation.commit(ReceiptId("abc".into())));

        assert!(registry.exists_for(WatcherId(3)));
        assert!(registry.reserve(WatcherId(3)).is_none(), "pending receipt gates");

        registry.remove_acknowledged(|r| r.id.0 == "abc");
        assert!(registry.reserve(WatcherId(3)).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ReceiptRegistry::new();
        let other = registry.clone();
        other.insert(receipt("r1", 1));
        assert_eq!(registry.len(), 1);
    }
}
