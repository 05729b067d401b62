// SPDX-License-Identifier: MIT

//! [`AgentValue`]: a pure value type holding an agent's identity,
//! schema-validated state, registered actions, and pending work.

use crate::action::{Action, ActionOutcome};
use crate::directive::Directive;
use crate::error::CoreError;
use crate::instruction::Instruction;
use crate::lifecycle::AgentLifecycle;
use crate::schema::{deep_merge, Schema};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

crate::define_id! {
    /// Identifies a single [`AgentValue`] instance.
    pub struct AgentId("agt-");
}

/// A pure, immutable-by-convention agent value. Every public operation
/// consumes `self` and returns a new value (or an error) rather than
/// mutating in place, mirroring the functional command-pipeline
/// contract this type is built around.
#[derive(Clone)]
pub struct AgentValue {
    pub id: AgentId,
    pub schema: Schema,
    pub state: serde_json::Map<String, Value>,
    actions: IndexMap<String, Arc<dyn Action>>,
    pub pending_instructions: VecDeque<Instruction>,
    pub result: Option<ActionOutcome>,
    pub dirty: bool,
}

impl std::fmt::Debug for AgentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentValue")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("pending_instructions", &self.pending_instructions.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl AgentValue {
    /// Construct a fresh agent value. An id is generated if none is
    /// given. Schema defaults are applied; `initial_state` overrides
    /// them via deep merge but is not itself validated here — the
    /// first `set` or `validate` call does that.
    pub fn new(id: Option<AgentId>, schema: Schema, initial_state: Option<serde_json::Map<String, Value>>) -> Self {
        let mut state = schema.defaults();
        if let Some(initial) = initial_state {
            deep_merge(&mut state, &initial);
        }
        Self {
            id: id.unwrap_or_default(),
            schema,
            state,
            actions: IndexMap::new(),
            pending_instructions: VecDeque::new(),
            result: None,
            dirty: false,
        }
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Deep-merge `attrs` into state, then validate and mark dirty.
    pub fn set(
        mut self,
        attrs: &serde_json::Map<String, Value>,
        strict: bool,
        hooks: &dyn AgentLifecycle,
    ) -> Result<Self, CoreError> {
        let mut merged = self.state.clone();
        deep_merge(&mut merged, attrs);
        let merged = hooks.on_before_validate(self.id.as_str(), merged);
        let validated = self.schema.validate(self.id.as_str(), &merged, strict)?;
        self.state = hooks.on_after_validate(self.id.as_str(), validated);
        self.dirty = true;
        Ok(self)
    }

    /// Validate current state against the schema without merging
    /// anything new in.
    pub fn validate(mut self, strict: bool, hooks: &dyn AgentLifecycle) -> Result<Self, CoreError> {
        let state = hooks.on_before_validate(self.id.as_str(), self.state.clone());
        let validated = self.schema.validate(self.id.as_str(), &state, strict)?;
        self.state = hooks.on_after_validate(self.id.as_str(), validated);
        Ok(self)
    }

    /// Prepend `action` to the registered set (newest first). Rejects
    /// a name collision with an already-registered action.
    pub fn register_action(mut self, action: Arc<dyn Action>) -> Result<Self, CoreError> {
        let name = action.name().to_string();
        if self.actions.contains_key(&name) {
            return Err(CoreError::DuplicateAction { agent_id: self.id.as_str().to_string(), action: name });
        }
        let mut next = IndexMap::with_capacity(self.actions.len() + 1);
        next.insert(name, action);
        next.extend(self.actions.drain(..));
        self.actions = next;
        Ok(self)
    }

    pub fn deregister_action(mut self, name: &str) -> Self {
        self.actions.shift_remove(name);
        self
    }

    /// Normalize `instructions` into queued [`Instruction`]s, merging
    /// `context` into each one's own context (instruction-local keys
    /// win), and checking every action is registered.
    pub fn plan(
        mut self,
        instructions: Vec<Instruction>,
        context: Option<serde_json::Map<String, Value>>,
        hooks: &dyn AgentLifecycle,
    ) -> Result<Self, CoreError> {
        for mut instruction in instructions {
            if !self.actions.contains_key(&instruction.action) {
                return Err(CoreError::UnregisteredAction {
                    agent_id: self.id.as_str().to_string(),
                    action: instruction.action.clone(),
                });
            }
            if let Some(shared) = &context {
                let mut merged = shared.clone();
                merged.extend(instruction.context.clone());
                instruction.context = merged;
            }
            let instruction = hooks.on_before_plan(self.id.as_str(), instruction);
            self.pending_instructions.push_back(instruction);
        }
        self.dirty = true;
        Ok(self)
    }

    /// Clear `dirty` and `result`; state and actions are untouched.
    pub fn reset(mut self) -> Self {
        self.dirty = false;
        self.result = None;
        self
    }

    /// Drain `pending_instructions` in order, running each through its
    /// registered action and folding the resulting state and
    /// directives back in. Stops and returns the first unrecovered
    /// error.
    pub async fn run(mut self, hooks: &dyn AgentLifecycle) -> Result<(Self, Vec<Directive>), CoreError> {
        let mut directives = Vec::new();

        while let Some(instruction) = self.pending_instructions.pop_front() {
            hooks.on_before_run(self.id.as_str(), &instruction);

            let action = self.actions.get(&instruction.action).cloned().ok_or_else(|| {
                CoreError::UnregisteredAction {
                    agent_id: self.id.as_str().to_string(),
                    action: instruction.action.clone(),
                }
            })?;

            let outcome = match action.run(&instruction, &self.state).await {
                Ok(outcome) => outcome,
                Err(err) => match hooks.on_error(self.id.as_str(), &err) {
                    Some(recovered) => recovered,
                    None => return Err(err),
                },
            };

            hooks.on_after_run(self.id.as_str(), &outcome);
            self.state = outcome.state.clone();
            directives.extend(outcome.directives.clone());
            self.result = Some(outcome);
        }

        hooks.on_after_directives(self.id.as_str(), &directives);
        self.dirty = false;
        Ok((self, directives))
    }
}

#[cfg(test)]
#[path = "agent_value_tests.rs"]
mod tests;
