//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pushwatch_check_total` (counter): check runs by watcher, outcome
//! - `pushwatch_check_duration_seconds` (histogram): check latency by watcher
//! - `pushwatch_notifications_total` (counter): sends by outcome
//!   (sent, suppressed, failed)
//! - `pushwatch_pending_receipts` (gauge): emergency alerts awaiting ack
//! - `pushwatch_receipts_retired_total` (counter): receipts settled

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::watcher::WatcherId;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_check(watcher: WatcherId, outcome: &'static str, elapsed: Duration) {
    let watcher = watcher.to_string();
    counter!("pushwatch_check_total", "watcher" => watcher.clone(), "outcome" => outcome).increment(1);
    histogram!("pushwatch_check_duration_seconds", "watcher" => watcher).record(elapsed.as_secs_f64());
}

pub fn record_notification(outcome: &'static str) {
    counter!("pushwatch_notifications_total", "outcome" => outcome).increment(1);
}

pub fn record_pending_receipts(count: usize) {
    gauge!("pushwatch_pending_receipts").set(count as f64);
}

pub fn record_receipts_retired(count: usize) {
    if count > 0 {
        counter!("pushwatch_receipts_retired_total").increment(count as u64);
    }
}
