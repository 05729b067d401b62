// SPDX-License-Identifier: MIT

//! The command pipeline: a deterministic `set -> plan -> run` chain
//! composing the [`AgentValue`] operations into a single call.

use crate::agent_value::AgentValue;
use crate::directive::Directive;
use crate::error::CoreError;
use crate::instruction::Instruction;
use crate::lifecycle::AgentLifecycle;
use async_trait::async_trait;
use serde_json::Value;

/// Options for a single [`cmd`] invocation.
#[derive(Debug, Clone, Default)]
pub struct CmdOpts {
    pub attrs: Option<serde_json::Map<String, Value>>,
    pub context: Option<serde_json::Map<String, Value>>,
    pub strict: bool,
}

impl CmdOpts {
    crate::setters! {
        option { attrs: serde_json::Map<String, Value> }
        option { context: serde_json::Map<String, Value> }
        set { strict: bool }
    }
}

/// Run `set(attrs) -> plan(instructions) -> run()` against `agent`,
/// skipping `set` entirely when no attrs are supplied.
pub async fn cmd(
    agent: AgentValue,
    instructions: Vec<Instruction>,
    opts: CmdOpts,
    hooks: &dyn AgentLifecycle,
) -> Result<(AgentValue, Vec<Directive>), CoreError> {
    let agent = match &opts.attrs {
        Some(attrs) if !attrs.is_empty() => agent.set(attrs, opts.strict, hooks)?,
        _ => agent,
    };
    let agent = agent.plan(instructions, opts.context, hooks)?;
    agent.run(hooks).await
}

/// A pluggable strategy for executing the run stage of the pipeline.
///
/// The default [`SimpleRunner`] just calls [`AgentValue::run`], but a
/// host can substitute a runner that adds concurrency limits,
/// deadlines, or retries around action execution.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(
        &self,
        agent: AgentValue,
        hooks: &dyn AgentLifecycle,
    ) -> Result<(AgentValue, Vec<Directive>), CoreError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRunner;

#[async_trait]
impl Runner for SimpleRunner {
    async fn run(
        &self,
        agent: AgentValue,
        hooks: &dyn AgentLifecycle,
    ) -> Result<(AgentValue, Vec<Directive>), CoreError> {
        agent.run(hooks).await
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
