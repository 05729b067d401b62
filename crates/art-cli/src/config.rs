// SPDX-License-Identifier: MIT

//! On-disk configuration: global defaults plus `[instances.<name>]`
//! overrides, loaded from a `toml` file. A [`CliConfig::default`] is
//! used whenever no file is given, so the demonstration binary runs
//! equally well from a config file or pure CLI flags.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_max_queue_size() -> usize {
    1000
}

/// Per-instance overrides, resolved over the global defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceOverride {
    pub max_queue_size: Option<usize>,
    pub idle_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Agent class name — informational, since this binary only knows
    /// one class (`calc`), but recorded the way a real deployment would
    /// resolve several.
    #[serde(default = "default_agent")]
    pub agent: String,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
    pub idle_timeout_ms: Option<u64>,
    /// When set, checkpoints are hibernated to disk under this directory
    /// instead of only living in memory for the process lifetime.
    pub storage_dir: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
    pub log_level: Option<String>,
    #[serde(default)]
    pub instances: HashMap<String, InstanceOverride>,
}

fn default_agent() -> String {
    "calc".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            agent: default_agent(),
            max_queue_size: default_max_queue_size(),
            idle_timeout_ms: None,
            storage_dir: None,
            debug: false,
            log_level: None,
            instances: HashMap::new(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("reading config {}: {err}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|err| anyhow::anyhow!("parsing config {}: {err}", path.display()))?;
        Ok(config)
    }

    pub fn max_queue_size_for(&self, instance: &str) -> usize {
        self.instances.get(instance).and_then(|o| o.max_queue_size).unwrap_or(self.max_queue_size)
    }

    pub fn idle_timeout_for(&self, instance: &str) -> Option<Duration> {
        self.instances
            .get(instance)
            .and_then(|o| o.idle_timeout_ms)
            .or(self.idle_timeout_ms)
            .map(Duration::from_millis)
    }

    /// Instance-then-global log level override, if either was set. A
    /// caller with no override should fall back to the observability
    /// substrate's own resolved default rather than a hardcoded value
    /// here, matching the resolution order in [`art_observability`].
    pub fn log_level_for(&self, instance: &str) -> Option<String> {
        self.instances.get(instance).and_then(|o| o.log_level.clone()).or_else(|| self.log_level.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
