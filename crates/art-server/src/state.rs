// SPDX-License-Identifier: MIT

//! `ServerState`: the runtime state owned exclusively by one
//! [`crate::server::AgentServer`] — as distinct from the `AgentValue`
//! it hosts.

use crate::debug_ring::{DebugEvent, DebugRing};
use crate::error::ServerError;
use crate::status::{Mode, Status};
use art_core::agent_value::AgentValue;
use art_core::signal::Signal;
use art_observability::{DebugConfig, DebugEventsMode, ObservabilityConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// A child registered via `Spawn`/`SpawnAgent`, tracked for
/// `StopChild` and introspection. The supervisor itself (actually
/// starting/monitoring a child process) is the Instance Manager's
/// concern; this registry is the bookkeeping side visible to
/// `ServerState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRecord {
    pub child_id: String,
    pub label: String,
    pub started_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerState {
    pub agent: AgentValue,
    pub status: Status,
    pub pending_signals: VecDeque<Signal>,
    pub max_queue_size: usize,
    pub mode: Mode,
    /// Ancillary runtime-owned state, distinct from the agent value's
    /// schema-validated state — this is what `StateModification`
    /// directives write to, since directives affect runtime state,
    /// not the agent value directly.
    pub runtime_state: serde_json::Map<String, Value>,
    pub children: IndexMap<String, ChildRecord>,
    pub debug_events: DebugRing,
    /// Resolved snapshot driving `record_debug`'s gating; refreshed
    /// whenever `set_debug` installs a runtime override.
    pub debug_config: DebugConfig,
    /// The local, per-agent override `set_debug` installs. Never
    /// written back to `observability` — a sibling instance sharing
    /// the same `ObservabilityConfig` never sees it.
    pub debug_override: Option<DebugConfig>,
    pub observability: Arc<ObservabilityConfig>,
    pub instance_name: Option<String>,
    pub queue_overflow_count: u64,
    pub attachment_count: u64,
    /// Append-only log of instructions processed since the last
    /// checkpoint, carried forward into the next hibernation so the
    /// persisted thread stays in step with the agent's checkpointed
    /// state.
    pub thread_log: Vec<Value>,
}

impl ServerState {
    pub fn new(
        agent: AgentValue,
        max_queue_size: usize,
        debug_config: DebugConfig,
        observability: Arc<ObservabilityConfig>,
    ) -> Self {
        let debug_events = DebugRing::new(debug_config.ring_buffer_size);
        Self {
            agent,
            status: Status::Initializing,
            pending_signals: VecDeque::new(),
            max_queue_size,
            mode: Mode::Auto,
            runtime_state: serde_json::Map::new(),
            children: IndexMap::new(),
            debug_events,
            debug_config,
            debug_override: None,
            observability,
            instance_name: None,
            queue_overflow_count: 0,
            attachment_count: 0,
            thread_log: Vec::new(),
        }
    }

    pub fn transition(&mut self, next: Status) -> Result<(), ServerError> {
        if !self.status.can_transition_to(next) {
            return Err(ServerError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Enqueue `signal` if there is room; otherwise record an
    /// overflow and reject it.
    pub fn enqueue(&mut self, signal: Signal) -> Result<(), ServerError> {
        if self.pending_signals.len() >= self.max_queue_size {
            self.queue_overflow_count += 1;
            self.record_debug(0, "queue.overflow", serde_json::json!({"size": self.pending_signals.len()}));
            return Err(ServerError::QueueOverflow { size: self.pending_signals.len() });
        }
        self.pending_signals.push_back(signal);
        Ok(())
    }

    /// Gated by the resolved `debug_events` flag, matching the
    /// observability substrate's own `emit_debug_event` contract.
    pub fn record_debug(&mut self, at_epoch_ms: u64, kind: &str, detail: Value) {
        if self.debug_config.debug_events == DebugEventsMode::Off {
            return;
        }
        self.debug_events.push(DebugEvent { at_epoch_ms, kind: kind.to_string(), detail });
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
