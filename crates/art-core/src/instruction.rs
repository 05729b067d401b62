// SPDX-License-Identifier: MIT

//! A single requested unit of work against an agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of an agent's plan: run `action` with `params`, against the
/// state produced by the steps before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
    #[serde(default)]
    pub context: serde_json::Map<String, Value>,
}

impl Instruction {
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: action.into(), params: serde_json::Map::new(), context: serde_json::Map::new() }
    }

    pub fn with_params(mut self, params: serde_json::Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn with_context(mut self, context: serde_json::Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod tests;
