//! pushwatch daemon
//!
//! # Architecture Overview
//!
//! ```text
//!   pushwatch.toml ──▶ config ──▶ checks::CheckRegistry ──▶ Watcher (one task each)
//!                                                              │
//!                               ┌──────────────────────────────┘
//!                               ▼
//!                     check ── timeout ──▶ failing?
//!                                            │
//!                                            ▼
//!                     notify::NotificationClient ──▶ Pushover /1/messages.json
//!                                            │
//!                           (emergency)      ▼
//!                                     ReceiptRegistry ◀── AckPoller ──▶ /1/receipts/{id}.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pushwatch::checks::CheckRegistry;
use pushwatch::config::{load_config, load_credentials, ConfigError, ObservabilityConfig};
use pushwatch::lifecycle::startup::{self, StartupError};
use pushwatch::notify::{Delivery, NotificationRequest};
use pushwatch::observability::logging;
use pushwatch::watcher::config::{DEFAULT_EXPIRE, DEFAULT_RETRY};
use pushwatch::watcher::Priority;

#[derive(Parser)]
#[command(name = "pushwatch")]
#[command(about = "Watchdog that alerts through Pushover when checks fail", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "pushwatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all configured watchers (default)
    Run,
    /// Load and validate the configuration, then exit
    Validate,
    /// Send a single notification and exit
    Notify {
        #[arg(short, long)]
        message: String,

        #[arg(short, long)]
        title: Option<String>,

        /// -2 (lowest) to 2 (emergency)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        priority: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            tracing::error!(path = %cli.config.display(), error = %e, "Failed to load configuration");
            eprintln!("pushwatch: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.observability);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "pushwatch starting");
            startup::run(config, CheckRegistry::with_builtin()).await
        }
        Commands::Validate => validate(&config),
        Commands::Notify { message, title, priority } => notify(&config, message, title, priority).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("pushwatch: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(config: &pushwatch::WatchdogConfig) -> Result<(), StartupError> {
    load_credentials(&config.pushover)?;

    let registry = CheckRegistry::with_builtin();
    for definition in &config.watchers {
        let (_, check) = registry.build(definition)?;
        println!("{:<8} {}", definition.kind, check.title());
    }
    println!("configuration OK ({} watchers)", config.watchers.len());
    Ok(())
}

async fn notify(
    config: &pushwatch::WatchdogConfig,
    message: String,
    title: Option<String>,
    priority: i64,
) -> Result<(), StartupError> {
    let priority = Priority::try_from(priority)
        .map_err(|e| ConfigError::Validation(vec![e]))?;
    let mut request = NotificationRequest::new(message);
    request.title = title;
    request.priority = priority;
    if priority.requires_ack() {
        request.retry = Some(DEFAULT_RETRY);
        request.expire = Some(DEFAULT_EXPIRE);
    }

    match startup::send_once(config, request).await? {
        Delivery::Tracked(receipt) => println!("sent (receipt {})", receipt),
        Delivery::Sent => println!("sent"),
        Delivery::Suppressed => println!("suppressed"),
    }
    Ok(())
}
