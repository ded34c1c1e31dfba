//! Watcher data model.
//!
//! # Data Flow
//! ```text
//! [[watchers]] table
//!     → config.rs (WatcherSettings → validated WatcherConfig)
//!     → check.rs (Check bound by the check registry)
//!     → scheduler (one task per watcher)
//!     → message.rs (failure text for notifications)
//! ```
//!
//! # Design Decisions
//! - Configs are immutable once built; mutable state lives in the scheduler
//! - Checks are trait objects so new types need no scheduler changes
//! - Message text never resolves host identity itself

pub mod check;
pub mod config;
pub mod message;

pub use check::{from_fn, Check, CheckError, CheckStatus, FnCheck};
pub use config::{Priority, Sound, WatcherConfig, WatcherSettings};
pub use message::MessageBuilder;

use std::fmt;

/// Identity of a registered watcher, assigned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(pub u64);

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}
