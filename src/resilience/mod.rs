//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Watcher cycle:
//!     → timeouts.rs (deadline + panic containment around the check)
//!     → outcome classified as passed / failed / timed out
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every check has a deadline
//! - A misbehaving check fails its own cycle, never its neighbours
//! - No in-cycle retries; the next cycle is the retry

pub mod timeouts;

pub use timeouts::{run_bounded, Bounded};
