//! Host memory threshold check.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::checks::registry::parse_params;
use crate::config::ConfigError;
use crate::watcher::{Check, CheckError, CheckStatus};

const DEFAULT_MEMINFO: &str = "/proc/meminfo";

#[derive(Debug, Deserialize)]
struct MemoryParams {
    max_mem: f64,
    #[serde(default = "default_max_swap")]
    max_swap: f64,
    meminfo_path: Option<PathBuf>,
}

fn default_max_swap() -> f64 {
    100.0
}

/// Memory figures in kB, as reported by `/proc/meminfo`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_available: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemInfo {
    /// Parse `/proc/meminfo` text.
    ///
    /// `MemAvailable` is estimated from free, buffers and cache on kernels
    /// that do not report it.
    pub fn parse(text: &str) -> Result<Self, CheckError> {
        let mut fields = std::collections::HashMap::new();
        for line in text.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let value = rest.trim().trim_end_matches("kB").trim();
            if let Ok(v) = value.parse::<u64>() {
                fields.insert(key.trim(), v);
            }
        }

        let get = |key: &str| fields.get(key).copied();
        let mem_total = get("MemTotal").ok_or_else(|| CheckError::Parse("MemTotal missing".into()))?;
        let mem_available = match get("MemAvailable") {
            Some(v) => v,
            None => {
                let free = get("MemFree").ok_or_else(|| CheckError::Parse("MemFree missing".into()))?;
                free + get("Buffers").unwrap_or(0) + get("Cached").unwrap_or(0)
            }
        };

        Ok(Self {
            mem_total,
            mem_available,
            swap_total: get("SwapTotal").unwrap_or(0),
            swap_free: get("SwapFree").unwrap_or(0),
        })
    }

    pub fn mem_used_percent(&self) -> f64 {
        percent(self.mem_total.saturating_sub(self.mem_available), self.mem_total)
    }

    /// `None` on hosts without swap.
    pub fn swap_used_percent(&self) -> Option<f64> {
        (self.swap_total > 0).then(|| percent(self.swap_total.saturating_sub(self.swap_free), self.swap_total))
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Fails when memory or swap usage exceeds a percentage threshold.
pub struct MemoryCheck {
    max_mem: f64,
    max_swap: f64,
    meminfo_path: PathBuf,
}

impl MemoryCheck {
    pub const KIND: &'static str = "memory";

    pub fn new(max_mem: f64, max_swap: f64) -> Self {
        Self {
            max_mem,
            max_swap,
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO),
        }
    }

    /// Read figures from `path` instead of `/proc/meminfo`.
    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    pub fn from_params(params: &toml::Table) -> Result<Box<dyn Check>, ConfigError> {
        let params: MemoryParams = parse_params(Self::KIND, params)?;
        for (name, value) in [("max_mem", params.max_mem), ("max_swap", params.max_swap)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidCheck {
                    kind: Self::KIND.to_string(),
                    reason: format!("{} must be a percentage (0-100), got {}", name, value),
                });
            }
        }

        let mut check = Self::new(params.max_mem, params.max_swap);
        if let Some(path) = params.meminfo_path {
            check = check.with_meminfo_path(path);
        }
        Ok(Box::new(check))
    }

    /// Compare figures against the thresholds.
    pub fn evaluate(&self, info: &MemInfo) -> CheckStatus {
        let mem = info.mem_used_percent();
        let swap = info.swap_used_percent();

        let mem_exceeded = mem > self.max_mem;
        let swap_exceeded = swap.is_some_and(|s| s > self.max_swap);
        if !mem_exceeded && !swap_exceeded {
            return CheckStatus::Passed;
        }

        CheckStatus::failed(format!(
            "memory usage above threshold [{:.0}%/{:.0}%]: {:.0}% mem / {} swap",
            self.max_mem,
            self.max_swap,
            mem,
            swap.map(|s| format!("{:.0}%", s)).unwrap_or_else(|| "no".to_string()),
        ))
    }
}

#[async_trait]
impl Check for MemoryCheck {
    fn title(&self) -> String {
        "Memory".to_string()
    }

    async fn run(&self) -> Result<CheckStatus, CheckError> {
        let text = tokio::fs::read_to_string(&self.meminfo_path).await?;
        let info = MemInfo::parse(&text)?;
        Ok(self.evaluate(&info))
    }
}
