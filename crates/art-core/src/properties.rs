// SPDX-License-Identifier: MIT

//! Property tests for the quantified invariants over [`AgentValue`]
//! and the command pipeline.

use crate::action::{Action, ActionOutcome};
use crate::agent_value::AgentValue;
use crate::error::CoreError;
use crate::instruction::Instruction;
use crate::lifecycle::NoopLifecycle;
use crate::pipeline::{cmd, CmdOpts};
use crate::schema::{FieldSpec, FieldType, Schema};
use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};

fn counter_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::new("count", FieldType::Integer).default(json!(0)))
        .field(FieldSpec::new("label", FieldType::String).default(json!("")))
}

struct Noop;

#[async_trait]
impl Action for Noop {
    fn name(&self) -> &str {
        "noop"
    }

    async fn run(
        &self,
        _instruction: &Instruction,
        state: &serde_json::Map<String, Value>,
    ) -> Result<ActionOutcome, CoreError> {
        Ok(ActionOutcome::new(state.clone()))
    }
}

proptest! {
    /// Invariant 1: `set` on a valid schema always yields state that
    /// conforms to the schema, and any key outside the schema is
    /// preserved unchanged (lenient mode).
    #[test]
    fn set_result_conforms_to_schema_and_preserves_unknown_keys(
        count in any::<i64>(),
        extra_value in any::<bool>(),
    ) {
        let agent = AgentValue::new(None, counter_schema(), None);
        let mut attrs = serde_json::Map::new();
        attrs.insert("count".into(), json!(count));
        attrs.insert("passthrough".into(), json!(extra_value));

        let agent = agent.set(&attrs, false, &NoopLifecycle).expect("valid attrs always validate");

        prop_assert_eq!(agent.state["count"].clone(), json!(count));
        prop_assert_eq!(agent.state["passthrough"].clone(), json!(extra_value));
        prop_assert!(agent.dirty);
    }

    /// Invariant 2: after a successful `cmd`, the pending queue is
    /// empty and the agent is no longer dirty.
    #[test]
    fn cmd_without_errors_drains_queue_and_clears_dirty(n_instructions in 0usize..6) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let agent = AgentValue::new(None, counter_schema(), None)
                .register_action(std::sync::Arc::new(Noop))
                .unwrap();

            let instructions = (0..n_instructions).map(|_| Instruction::new("noop")).collect();

            let (agent, _directives) = cmd(agent, instructions, CmdOpts::default(), &NoopLifecycle)
                .await
                .expect("noop action never fails");

            assert!(agent.pending_instructions.is_empty());
            assert!(!agent.dirty);
        });
    }
}
