//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! Failing watcher cycle:
//!     → request.rs (NotificationRequest from WatcherConfig + message)
//!     → client.rs (dedup gate via receipt.rs reservation)
//!     → provider.rs (POST /1/messages.json)
//!     → receipt.rs (emergency priority: record pending receipt)
//!
//! Ack poller watcher (ack.rs):
//!     Snapshot pending receipts
//!     → GET /1/receipts/{id}.json per receipt
//!     → Retire acknowledged/expired receipts
//! ```
//!
//! # Design Decisions
//! - The receipt registry is the only state shared between watcher tasks
//! - A delivery failure never creates a receipt and never retries in-cycle
//! - The provider sits behind a trait so dispatch logic tests offline

pub mod ack;
pub mod client;
pub mod provider;
pub mod receipt;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use ack::AckPoller;
pub use client::{Delivery, NotificationClient};
pub use provider::{PushProvider, PushoverApi, ReceiptStatus, SendResponse};
pub use receipt::{Receipt, ReceiptId, ReceiptRegistry, Reservation};
pub use request::NotificationRequest;

use std::time::Duration;

use thiserror::Error;

use crate::watcher::message::format_duration;

/// Errors talking to the push provider.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or protocol failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The provider answered but refused the request.
    #[error("provider rejected request (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// An emergency alert was accepted but no receipt came back.
    #[error("emergency alert accepted without a receipt")]
    MissingReceipt,

    #[error("invalid provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The provider did not answer within the lookup budget.
    #[error("no provider response within {}", format_duration(*.0))]
    Timeout(Duration),

    /// The provider issued a receipt id that is already being tracked.
    #[error("receipt {0} is already tracked")]
    DuplicateReceipt(ReceiptId),
}
