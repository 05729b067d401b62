// SPDX-License-Identifier: MIT

use super::*;
use crate::directive::Directive;
use async_trait::async_trait;
use serde_json::json;

struct Increment;

#[async_trait]
impl Action for Increment {
    fn name(&self) -> &str {
        "increment"
    }

    async fn run(
        &self,
        instruction: &Instruction,
        state: &serde_json::Map<String, Value>,
    ) -> Result<ActionOutcome, CoreError> {
        let by = instruction.param("by").and_then(Value::as_i64).unwrap_or(1);
        let current = state.get("count").and_then(Value::as_i64).unwrap_or(0);
        let mut next = state.clone();
        next.insert("count".into(), json!(current + by));
        Ok(ActionOutcome::new(next).with_directive(Directive::emit(json!({"incremented_by": by}))))
    }
}

#[tokio::test]
async fn action_runs_and_returns_directives() {
    let action = Increment;
    let instr = Instruction::new("increment").with_params(serde_json::Map::from_iter([("by".into(), json!(3))]));
    let mut state = serde_json::Map::new();
    state.insert("count".into(), json!(2));

    let outcome = action.run(&instr, &state).await.expect("increment succeeds");
    assert_eq!(outcome.state["count"], json!(5));
    assert_eq!(outcome.directives.len(), 1);
}

#[test]
fn action_outcome_builders_accumulate_directives() {
    let outcome = ActionOutcome::new(serde_json::Map::new())
        .with_directives(vec![Directive::emit(json!(1)), Directive::emit(json!(2))]);
    assert_eq!(outcome.directives.len(), 2);
}
