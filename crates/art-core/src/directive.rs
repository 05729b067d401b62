// SPDX-License-Identifier: MIT

//! Directives: effects an action or command pipeline asks the host
//! server to apply. Directives never mutate agent state directly —
//! only the directive interpreter, against `ServerState`, does.

use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of update a [`Directive::StateModification`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateOp {
    Set,
    Delete,
    Update,
}

crate::simple_display! {
    StateOp {
        Set => "set",
        Delete => "delete",
        Update => "update",
    }
}

/// A pending child start, resolved by the supervisor, not by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildSpec {
    pub child_id: String,
    #[serde(default)]
    pub args: serde_json::Map<String, Value>,
}

/// Options for starting a child agent server under [`Directive::SpawnAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnAgentOpts {
    pub agent_class: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub initial_state: serde_json::Map<String, Value>,
}

/// An effect emitted by an action's `run` or the command pipeline,
/// applied to runtime state by the directive interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Directive {
    Emit { signal: Signal },
    Spawn { spec: ChildSpec },
    SpawnAgent { opts: SpawnAgentOpts },
    StopChild { child_id: String },
    Schedule { delay_ms: u64, signal: Signal },
    Stop { reason: String },
    Enqueue { instruction: crate::instruction::Instruction },
    StateModification { op: StateOp, path: String, value: Value },
    Error { reason: String },
}

impl Directive {
    pub fn emit(data: Value) -> Self {
        Directive::Emit { signal: Signal::new("art.agent.evt.emitted", data) }
    }

    pub fn schedule(delay_ms: u64, signal: Signal) -> Self {
        Directive::Schedule { delay_ms, signal }
    }

    pub fn stop(reason: impl Into<String>) -> Self {
        Directive::Stop { reason: reason.into() }
    }

    pub fn set_path(path: impl Into<String>, value: Value) -> Self {
        Directive::StateModification { op: StateOp::Set, path: path.into(), value }
    }

    pub fn delete_path(path: impl Into<String>) -> Self {
        Directive::StateModification { op: StateOp::Delete, path: path.into(), value: Value::Null }
    }

    /// Directive name for log spans (e.g. `"emit"`, `"spawn_agent"`).
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Emit { .. } => "emit",
            Directive::Spawn { .. } => "spawn",
            Directive::SpawnAgent { .. } => "spawn_agent",
            Directive::StopChild { .. } => "stop_child",
            Directive::Schedule { .. } => "schedule",
            Directive::Stop { .. } => "stop",
            Directive::Enqueue { .. } => "enqueue",
            Directive::StateModification { .. } => "state_modification",
            Directive::Error { .. } => "error",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Directive::Emit { signal } => vec![
                ("signal_type", signal.signal_type.clone()),
                ("signal_id", signal.id.to_string()),
            ],
            Directive::Spawn { spec } => vec![("child_id", spec.child_id.clone())],
            Directive::SpawnAgent { opts } => vec![
                ("agent_class", opts.agent_class.clone()),
                ("id", opts.id.clone().unwrap_or_default()),
            ],
            Directive::StopChild { child_id } => vec![("child_id", child_id.clone())],
            Directive::Schedule { delay_ms, signal } => vec![
                ("delay_ms", delay_ms.to_string()),
                ("signal_type", signal.signal_type.clone()),
            ],
            Directive::Stop { reason } => vec![("reason", reason.clone())],
            Directive::Enqueue { instruction } => vec![("action", instruction.action.clone())],
            Directive::StateModification { op, path, .. } => {
                vec![("op", op.to_string()), ("path", path.clone())]
            }
            Directive::Error { reason } => vec![("reason", reason.clone())],
        }
    }

    /// Whether to log both start and stop events, versus a single
    /// terse "executed" line, for high-frequency directives.
    pub fn verbose(&self) -> bool {
        match self {
            Directive::Emit { .. } | Directive::Schedule { .. } | Directive::StateModification { .. } => false,
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
