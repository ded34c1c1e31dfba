//! Check type registry.
//!
//! Maps the `type` of a `[[watchers]]` entry to a constructor. Types are
//! registered explicitly; nothing registers itself.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::checks::{HttpCheck, MemoryCheck};
use crate::config::{ConfigError, WatcherDefinition};
use crate::watcher::{Check, WatcherConfig};

type Constructor = Box<dyn Fn(&toml::Table) -> Result<Box<dyn Check>, ConfigError> + Send + Sync>;

/// Named constructors for check types.
#[derive(Default)]
pub struct CheckRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the `http` and `memory` check types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(HttpCheck::KIND, HttpCheck::from_params);
        registry.register(MemoryCheck::KIND, MemoryCheck::from_params);
        registry
    }

    /// Register `constructor` under `kind`, replacing any earlier entry.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&toml::Table) -> Result<Box<dyn Check>, ConfigError> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build the validated config and bound check for one entry.
    pub fn build(&self, definition: &WatcherDefinition) -> Result<(WatcherConfig, Box<dyn Check>), ConfigError> {
        let constructor = self
            .constructors
            .get(&definition.kind)
            .ok_or_else(|| ConfigError::UnknownCheckType(definition.kind.clone()))?;

        let settings = definition.settings().map_err(|e| ConfigError::InvalidCheck {
            kind: definition.kind.clone(),
            reason: e.to_string(),
        })?;
        let config = WatcherConfig::from_settings(settings).map_err(ConfigError::Validation)?;
        let check = constructor(&definition.params)?;

        Ok((config, check))
    }
}

/// Deserialize the type-specific keys of a watcher entry.
pub fn parse_params<T: DeserializeOwned>(kind: &str, params: &toml::Table) -> Result<T, ConfigError> {
    toml::Value::Table(params.clone())
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::InvalidCheck {
            kind: kind.to_string(),
            reason: e.to_string(),
        })
}
