//! Push-notification watchdog library.
//!
//! Watchers run a check on their own cadence and alert through the
//! Pushover API when it fails. Emergency alerts are deduplicated by
//! their pending receipt until someone acknowledges them.

pub mod checks;
pub mod config;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod resilience;
pub mod scheduler;
pub mod watcher;

pub use config::schema::WatchdogConfig;
pub use lifecycle::Shutdown;
pub use notify::NotificationClient;
pub use scheduler::Scheduler;
