// SPDX-License-Identifier: MIT

//! Debug/telemetry configuration and its four-level resolution order:
//! runtime override -> per-instance -> global -> built-in default.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugLevel {
    Off,
    On,
    Verbose,
}

impl Default for DebugLevel {
    fn default() -> Self {
        DebugLevel::Off
    }
}

/// How a tracer sink failure is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracerFailureMode {
    /// Log and isolate: the span completes despite the sink failing.
    Warn,
    /// Propagate: the span is aborted and the error surfaces to the caller.
    Strict,
}

impl Default for TracerFailureMode {
    fn default() -> Self {
        TracerFailureMode::Warn
    }
}

/// How much of an action/instruction's arguments a debug event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogArgsMode {
    /// Arguments are never logged.
    None,
    /// Only the argument keys are logged, not their values.
    KeysOnly,
    /// Full argument values are logged (subject to `redact_sensitive`).
    Full,
}

impl Default for LogArgsMode {
    fn default() -> Self {
        LogArgsMode::None
    }
}

/// How much of the signal/directive pipeline emits debug-ring events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugEventsMode {
    /// No debug events are recorded.
    Off,
    /// Only notable events (overflow, slow turns, errors) are recorded.
    Minimal,
    /// Every signal turn and directive is recorded.
    All,
}

impl Default for DebugEventsMode {
    fn default() -> Self {
        DebugEventsMode::All
    }
}

/// A resolved, immutable snapshot of debug/telemetry behavior for one
/// signal turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    pub log_level: DebugLevel,
    pub log_args: LogArgsMode,
    pub slow_signal_ms: u64,
    pub slow_directive_ms: u64,
    pub interesting_types: Vec<String>,
    pub debug_events: DebugEventsMode,
    pub redact_sensitive: bool,
    pub tracer_failure_mode: TracerFailureMode,
    pub ring_buffer_size: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: DebugLevel::Off,
            log_args: LogArgsMode::None,
            slow_signal_ms: 250,
            slow_directive_ms: 100,
            interesting_types: Vec::new(),
            debug_events: DebugEventsMode::All,
            redact_sensitive: true,
            tracer_failure_mode: TracerFailureMode::Warn,
            ring_buffer_size: 100,
        }
    }
}

impl DebugConfig {
    /// Compose a full config from a single [`DebugLevel`] dial: `off`
    /// is the built-in default, `on` widens argument/event capture to
    /// keys-only/minimal, `verbose` widens it to full/all. Redaction
    /// never loosens on its own — it stays at the default across every
    /// level and can only be changed by constructing a `DebugConfig`
    /// directly.
    pub fn from_level(level: DebugLevel) -> Self {
        match level {
            DebugLevel::Off => DebugConfig::default(),
            DebugLevel::On => DebugConfig {
                log_level: DebugLevel::On,
                log_args: LogArgsMode::KeysOnly,
                debug_events: DebugEventsMode::Minimal,
                ..DebugConfig::default()
            },
            DebugLevel::Verbose => DebugConfig {
                log_level: DebugLevel::Verbose,
                log_args: LogArgsMode::Full,
                debug_events: DebugEventsMode::All,
                ..DebugConfig::default()
            },
        }
    }
}

/// Process-wide debug configuration store. One instance is normally
/// shared (via `Arc`) across every agent server and instance manager
/// in a process.
#[derive(Debug, Default)]
pub struct ObservabilityConfig {
    global: RwLock<Option<DebugConfig>>,
    per_instance: RwLock<HashMap<String, DebugConfig>>,
}

impl ObservabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global(&self, config: DebugConfig) {
        *self.global.write() = Some(config);
    }

    pub fn set_instance(&self, instance: impl Into<String>, config: DebugConfig) {
        self.per_instance.write().insert(instance.into(), config);
    }

    /// Resolve effective config: `runtime_override` wins outright,
    /// then the named instance's override, then the process-wide
    /// global, then [`DebugConfig::default`].
    pub fn resolve(&self, instance: Option<&str>, runtime_override: Option<DebugConfig>) -> DebugConfig {
        if let Some(cfg) = runtime_override {
            return cfg;
        }
        if let Some(name) = instance {
            if let Some(cfg) = self.per_instance.read().get(name).cloned() {
                return cfg;
            }
        }
        if let Some(cfg) = self.global.read().clone() {
            return cfg;
        }
        DebugConfig::default()
    }

    /// Test-isolation hook: clear one instance's override, or every
    /// override (instance and global) when `instance` is `None`.
    pub fn reset(&self, instance: Option<&str>) {
        match instance {
            Some(name) => {
                self.per_instance.write().remove(name);
            }
            None => {
                self.per_instance.write().clear();
                *self.global.write() = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
