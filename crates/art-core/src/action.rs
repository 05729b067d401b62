// SPDX-License-Identifier: MIT

//! The [`Action`] trait: a single named unit of work an agent can run.

use crate::directive::Directive;
use crate::error::CoreError;
use crate::instruction::Instruction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The result of a single successful action run: the (possibly
/// unchanged) new agent state plus zero or more directives for the
/// host server to apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub state: serde_json::Map<String, Value>,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

impl ActionOutcome {
    pub fn new(state: serde_json::Map<String, Value>) -> Self {
        Self { state, directives: Vec::new() }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn with_directives(mut self, directives: impl IntoIterator<Item = Directive>) -> Self {
        self.directives.extend(directives);
        self
    }
}

/// A named unit of work that an agent can be instructed to run.
///
/// Implementations receive the agent's current state and the
/// instruction's params, and return the agent's next state together
/// with any directives for the host server. Actions are async because
/// real work (I/O, network calls, sub-computation) commonly is, but a
/// purely synchronous action can simply return immediately.
#[async_trait]
pub trait Action: Send + Sync {
    /// The name this action is registered and invoked under.
    fn name(&self) -> &str;

    async fn run(
        &self,
        instruction: &Instruction,
        state: &serde_json::Map<String, Value>,
    ) -> Result<ActionOutcome, CoreError>;
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
