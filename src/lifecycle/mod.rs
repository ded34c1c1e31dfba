//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Credentials → Provider → Watchers → Run
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Watchers finish in-flight cycle → Exit at next sleep
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then provider, then watchers
//! - A cycle is never aborted mid-send by shutdown
//! - A second signal forces exit

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
