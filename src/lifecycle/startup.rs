//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve credentials and build the provider client
//! - Bind every configured watcher to its check
//! - Start background services (metrics), then the scheduler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The ack poller is always the last watcher registered

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::checks::CheckRegistry;
use crate::config::{load_credentials, ConfigError, WatchdogConfig};
use crate::lifecycle::{signals, Shutdown};
use crate::notify::{
    Delivery, NotificationClient, NotificationRequest, NotifyError, PushProvider, PushoverApi, ReceiptRegistry,
};
use crate::observability::metrics;
use crate::scheduler::Scheduler;
use crate::watcher::message::local_hostname;
use crate::watcher::{MessageBuilder, WatcherId};

/// Owner of notifications sent outside the scheduler. Scheduler ids count
/// up from zero and never reach it.
pub const OPERATOR: WatcherId = WatcherId(u64::MAX);

/// Errors that prevent the daemon from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] NotifyError),

    #[error("metrics endpoint failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Build the notification client from config and resolved credentials.
pub fn build_notifier(config: &WatchdogConfig) -> Result<NotificationClient, StartupError> {
    let credentials = load_credentials(&config.pushover)?;
    let api = PushoverApi::new(
        &config.pushover.api_url,
        credentials,
        config.pushover.request_timeout(),
    )?;
    let provider: Arc<dyn PushProvider> = Arc::new(api);

    Ok(NotificationClient::new(provider, ReceiptRegistry::new())
        .with_device(config.pushover.device.clone()))
}

/// Send one notification through the configured provider and exit.
pub async fn send_once(config: &WatchdogConfig, request: NotificationRequest) -> Result<Delivery, StartupError> {
    let notifier = build_notifier(config)?;
    Ok(notifier.submit(OPERATOR, request).await?)
}

/// Build a scheduler holding every configured watcher plus the ack poller.
pub fn build_scheduler(
    config: &WatchdogConfig,
    registry: &CheckRegistry,
    notifier: NotificationClient,
) -> Result<Scheduler, StartupError> {
    let hostname = config.hostname.clone().unwrap_or_else(local_hostname);
    let mut scheduler = Scheduler::new(notifier, MessageBuilder::new(hostname));

    for definition in &config.watchers {
        let (watcher_config, check) = registry.build(definition)?;
        scheduler.register(watcher_config, check);
    }
    scheduler.register_ack_poller(config.ack_poller.delay(), config.ack_poller.timeout());

    Ok(scheduler)
}

/// Run the daemon until SIGINT/SIGTERM.
pub async fn run(config: WatchdogConfig, registry: CheckRegistry) -> Result<(), StartupError> {
    let observability = &config.observability;
    if observability.metrics_enabled {
        let addr: SocketAddr = observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let notifier = build_notifier(&config)?;
    let scheduler = build_scheduler(&config, &registry, notifier)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    tracing::info!(watchers = scheduler.len(), ">>> Running <<<");
    scheduler.run(&shutdown).await;
    Ok(())
}
