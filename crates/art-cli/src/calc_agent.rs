// SPDX-License-Identifier: MIT

//! A tiny demonstration agent class: a running integer accumulator
//! with `add`, `sub`, `mul`, and `reset` actions, wired through the
//! server and instance manager the same way a real agent class would
//! be.

use art_core::action::{Action, ActionOutcome};
use art_core::error::CoreError;
use art_core::instruction::Instruction;
use art_core::schema::{FieldSpec, FieldType, Schema};
use async_trait::async_trait;
use serde_json::{json, Value};

pub fn schema() -> Schema {
    Schema::new().field(FieldSpec::new("value", FieldType::Integer).default(json!(0)))
}

fn operand(instruction: &Instruction) -> Result<i64, CoreError> {
    instruction.param("by").and_then(Value::as_i64).ok_or_else(|| CoreError::InvalidInstruction {
        agent_id: String::new(),
        reason: format!("`{}` requires an integer `by` param", instruction.action),
    })
}

fn current(state: &serde_json::Map<String, Value>) -> i64 {
    state.get("value").and_then(Value::as_i64).unwrap_or(0)
}

struct Add;

#[async_trait]
impl Action for Add {
    fn name(&self) -> &str {
        "add"
    }

    async fn run(&self, instruction: &Instruction, state: &serde_json::Map<String, Value>) -> Result<ActionOutcome, CoreError> {
        let mut next = state.clone();
        next.insert("value".into(), json!(current(state) + operand(instruction)?));
        Ok(ActionOutcome::new(next))
    }
}

struct Sub;

#[async_trait]
impl Action for Sub {
    fn name(&self) -> &str {
        "sub"
    }

    async fn run(&self, instruction: &Instruction, state: &serde_json::Map<String, Value>) -> Result<ActionOutcome, CoreError> {
        let mut next = state.clone();
        next.insert("value".into(), json!(current(state) - operand(instruction)?));
        Ok(ActionOutcome::new(next))
    }
}

struct Mul;

#[async_trait]
impl Action for Mul {
    fn name(&self) -> &str {
        "mul"
    }

    async fn run(&self, instruction: &Instruction, state: &serde_json::Map<String, Value>) -> Result<ActionOutcome, CoreError> {
        let mut next = state.clone();
        next.insert("value".into(), json!(current(state) * operand(instruction)?));
        Ok(ActionOutcome::new(next))
    }
}

struct Reset;

#[async_trait]
impl Action for Reset {
    fn name(&self) -> &str {
        "reset"
    }

    async fn run(&self, _instruction: &Instruction, state: &serde_json::Map<String, Value>) -> Result<ActionOutcome, CoreError> {
        let mut next = state.clone();
        next.insert("value".into(), json!(0));
        Ok(ActionOutcome::new(next))
    }
}

pub fn actions() -> Vec<std::sync::Arc<dyn Action>> {
    vec![std::sync::Arc::new(Add), std::sync::Arc::new(Sub), std::sync::Arc::new(Mul), std::sync::Arc::new(Reset)]
}

#[cfg(test)]
#[path = "calc_agent_tests.rs"]
mod tests;
