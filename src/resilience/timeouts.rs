//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound a check future by its deadline
//! - Cancel the future cleanly when the deadline passes
//! - Contain panics raised while polling it
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the future is dropped at the deadline
//! - Timeout and panic are distinct from the future's own output

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time;

/// Result of a time-boxed run.
#[derive(Debug, PartialEq, Eq)]
pub enum Bounded<T> {
    Completed(T),
    TimedOut,
    /// The future panicked; carries the panic message.
    Panicked(String),
}

/// Run `fut` for at most `deadline`, catching panics.
pub async fn run_bounded<F>(deadline: Duration, fut: F) -> Bounded<F::Output>
where
    F: Future,
{
    match time::timeout(deadline, AssertUnwindSafe(fut).catch_unwind()).await {
        Ok(Ok(output)) => Bounded::Completed(output),
        Ok(Err(panic)) => Bounded::Panicked(panic_message(panic.as_ref())),
        Err(_) => Bounded::TimedOut,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
