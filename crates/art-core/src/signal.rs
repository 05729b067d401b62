// SPDX-License-Identifier: MIT

//! The [`Signal`] envelope: a routed, correlated message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Identifies a single [`Signal`] instance.
    pub struct SignalId("sig-");
}

/// A dispatch sink selector attached to a signal, resolved by the
/// observability/dispatch layer rather than interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub sink: String,
    #[serde(default)]
    pub opts: serde_json::Map<String, Value>,
}

/// A routed, correlated message flowing through an agent server.
///
/// `signal_type` is a hierarchical dotted string (e.g.
/// `art.agent.cmd.stop`) matched against router patterns that may use
/// `*` (single segment) and `**` (any number of trailing segments)
/// wildcards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub signal_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub source: String,
    pub correlation_id: String,
    #[serde(default)]
    pub causation_id: Option<String>,
    pub trace_id: String,
    pub span_id: String,
    #[serde(default)]
    pub parent_span_id: Option<String>,
    #[serde(default)]
    pub dispatch_config: Option<DispatchConfig>,
}

impl Signal {
    /// Start a new correlation chain: `correlation_id` and `trace_id`
    /// default to the signal's own id, and there is no causation or
    /// parent span yet.
    pub fn new(signal_type: impl Into<String>, data: Value) -> Self {
        let id = SignalId::new();
        Self {
            trace_id: id.as_str().to_string(),
            correlation_id: id.as_str().to_string(),
            span_id: id.as_str().to_string(),
            id,
            signal_type: signal_type.into(),
            data,
            source: String::new(),
            causation_id: None,
            parent_span_id: None,
            dispatch_config: None,
        }
    }

    /// Derive a new signal caused by `self`, inheriting `trace_id` and
    /// `correlation_id`, with `self.span_id` becoming the new
    /// `parent_span_id` and `self.id` the new `causation_id`.
    pub fn derive(&self, signal_type: impl Into<String>, data: Value) -> Self {
        let id = SignalId::new();
        Self {
            span_id: id.as_str().to_string(),
            id,
            signal_type: signal_type.into(),
            data,
            source: self.source.clone(),
            correlation_id: self.correlation_id.clone(),
            causation_id: Some(self.id.as_str().to_string()),
            trace_id: self.trace_id.clone(),
            parent_span_id: Some(self.span_id.clone()),
            dispatch_config: self.dispatch_config.clone(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Segment-wise view of [`Self::signal_type`] for router matching.
    pub fn type_segments(&self) -> Vec<&str> {
        self.signal_type.split('.').collect()
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
