//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WatchdogConfig (validated, immutable)
//!
//! credentials (env / token file / inline)
//!     → credentials.rs (resolved once at startup)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Watcher entries keep type-specific keys for the check registry

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod validation;

pub use credentials::{load_credentials, Credentials};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AckPollerConfig, ObservabilityConfig, PushoverConfig, WatchdogConfig, WatcherDefinition};
pub use validation::{validate_config, ValidationError};
