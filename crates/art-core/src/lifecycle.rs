// SPDX-License-Identifier: MIT

//! Lifecycle hooks invoked around each command-pipeline stage.
//!
//! All hooks have pass-through default implementations so an agent
//! class that needs no customization can simply use [`NoopLifecycle`].

use crate::action::ActionOutcome;
use crate::directive::Directive;
use crate::error::CoreError;
use crate::instruction::Instruction;
use serde_json::Value;

pub trait AgentLifecycle: Send + Sync {
    fn on_before_validate(
        &self,
        _agent_id: &str,
        state: serde_json::Map<String, Value>,
    ) -> serde_json::Map<String, Value> {
        state
    }

    fn on_after_validate(
        &self,
        _agent_id: &str,
        state: serde_json::Map<String, Value>,
    ) -> serde_json::Map<String, Value> {
        state
    }

    fn on_before_plan(&self, _agent_id: &str, instruction: Instruction) -> Instruction {
        instruction
    }

    fn on_before_run(&self, _agent_id: &str, _instruction: &Instruction) {}

    fn on_after_run(&self, _agent_id: &str, _outcome: &ActionOutcome) {}

    fn on_after_directives(&self, _agent_id: &str, _directives: &[Directive]) {}

    /// Called once, after the receive loop decides to stop and before
    /// any configured hibernation runs. `reason` is the `Directive::Stop`
    /// reason that triggered termination.
    fn on_shutdown(&self, _agent_id: &str, _reason: &str) {}

    /// Called when an action run fails. Returning `Some(outcome)`
    /// recovers the pipeline as if that outcome had been produced
    /// directly; returning `None` propagates the error to the caller.
    fn on_error(&self, _agent_id: &str, _error: &CoreError) -> Option<ActionOutcome> {
        None
    }
}

/// The default lifecycle: every hook passes its input straight through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycle;

impl AgentLifecycle for NoopLifecycle {}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
