// SPDX-License-Identifier: MIT

//! The directive interpreter: applies the effects returned by the
//! command pipeline to `ServerState`, never to the agent value's
//! schema-validated state directly.

use crate::state::{ChildRecord, ServerState};
use art_core::clock::Clock;
use art_core::directive::{Directive, StateOp};
use art_core::signal::Signal;
use art_signal::Dispatcher;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of interpreting one directive batch.
#[derive(Debug, Default)]
pub struct InterpretOutcome {
    /// Signals scheduled to fire after a delay, as `(delay_ms, signal)`.
    pub scheduled: Vec<(u64, Signal)>,
    pub stop_requested: Option<String>,
}

/// Stamp `signal` with the correlation context of the signal whose
/// processing produced it: inherits `trace_id`/`correlation_id`, and
/// points `parent_span_id`/`causation_id` back at `causing`. Unlike
/// [`Signal::derive`], this keeps the emitted signal's own id, type,
/// data and dispatch config — it enriches a signal an action already
/// built, rather than minting a new one.
fn enrich_emitted(signal: Signal, causing: &Signal) -> Signal {
    Signal {
        trace_id: causing.trace_id.clone(),
        correlation_id: causing.correlation_id.clone(),
        parent_span_id: Some(causing.span_id.clone()),
        causation_id: Some(causing.id.to_string()),
        ..signal
    }
}

pub async fn apply_directives(
    state: &mut ServerState,
    directives: Vec<Directive>,
    causing: &Signal,
    dispatcher: &Arc<dyn Dispatcher>,
    clock: &dyn Clock,
) -> Result<InterpretOutcome, crate::error::ServerError> {
    let mut outcome = InterpretOutcome::default();

    for directive in directives {
        match directive {
            Directive::Emit { signal } => {
                let enriched = enrich_emitted(signal, causing);
                if let Err(err) = dispatcher.dispatch(enriched).await {
                    tracing::warn!(error = %err, "directive emit dispatch failed");
                }
            }
            Directive::Enqueue { instruction } => {
                state.agent.pending_instructions.push_back(instruction);
            }
            Directive::StateModification { op, path, value } => {
                apply_state_modification(&mut state.runtime_state, op, &path, value);
            }
            Directive::Spawn { spec } => {
                state.children.insert(
                    spec.child_id.clone(),
                    ChildRecord { child_id: spec.child_id, label: "generic".into(), started_at_ms: clock.epoch_ms() },
                );
            }
            Directive::SpawnAgent { opts } => {
                let child_id = opts.id.clone().unwrap_or_else(|| opts.agent_class.clone());
                state.children.insert(
                    child_id.clone(),
                    ChildRecord { child_id, label: opts.agent_class, started_at_ms: clock.epoch_ms() },
                );
            }
            Directive::StopChild { child_id } => {
                state.children.shift_remove(&child_id);
            }
            Directive::Schedule { delay_ms, signal } => {
                outcome.scheduled.push((delay_ms, enrich_emitted(signal, causing)));
            }
            Directive::Stop { reason } => {
                outcome.stop_requested = Some(reason);
                break;
            }
            Directive::Error { reason } => {
                return Err(crate::error::ServerError::Core(art_core::error::CoreError::ActionFailed {
                    agent_id: state.agent.id.as_str().to_string(),
                    action: "directive_interpreter".to_string(),
                    reason,
                }));
            }
        }
    }

    Ok(outcome)
}

fn apply_state_modification(root: &mut serde_json::Map<String, Value>, op: StateOp, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return;
    }
    match op {
        StateOp::Set => set_path(root, &parts, value),
        StateOp::Delete => {
            delete_path(root, &parts);
        }
        StateOp::Update => update_path(root, &parts, value),
    }
}

fn set_path(map: &mut serde_json::Map<String, Value>, parts: &[&str], value: Value) {
    if parts.len() == 1 {
        map.insert(parts[0].to_string(), value);
        return;
    }
    let entry = map.entry(parts[0].to_string()).or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(inner) = entry {
        set_path(inner, &parts[1..], value);
    }
}

fn delete_path(map: &mut serde_json::Map<String, Value>, parts: &[&str]) -> bool {
    if parts.len() == 1 {
        map.remove(parts[0]);
        return true;
    }
    match map.get_mut(parts[0]) {
        Some(Value::Object(inner)) => delete_path(inner, &parts[1..]),
        _ => true,
    }
}

/// `update` deep-merges an object `value` into whatever is already at
/// `path`; for any other existing shape it behaves like `set`.
fn update_path(map: &mut serde_json::Map<String, Value>, parts: &[&str], value: Value) {
    if parts.len() == 1 {
        match (map.get_mut(parts[0]), &value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                art_core::schema::deep_merge(existing, incoming);
            }
            _ => {
                map.insert(parts[0].to_string(), value);
            }
        }
        return;
    }
    let entry = map.entry(parts[0].to_string()).or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(inner) = entry {
        update_path(inner, &parts[1..], value);
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
