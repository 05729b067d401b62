// SPDX-License-Identifier: MIT

use super::*;

fn instruction(action: &str, by: i64) -> Instruction {
    Instruction::new(action).with_params(serde_json::Map::from_iter([("by".into(), json!(by))]))
}

#[tokio::test]
async fn add_increments_value_by_the_given_amount() {
    let state = serde_json::Map::from_iter([("value".into(), json!(5))]);
    let outcome = Add.run(&instruction("add", 3), &state).await.unwrap();
    assert_eq!(outcome.state["value"], json!(8));
}

#[tokio::test]
async fn sub_and_mul_apply_against_the_current_value() {
    let state = serde_json::Map::from_iter([("value".into(), json!(10))]);
    let after_sub = Sub.run(&instruction("sub", 4), &state).await.unwrap();
    assert_eq!(after_sub.state["value"], json!(6));

    let after_mul = Mul.run(&instruction("mul", 3), &after_sub.state).await.unwrap();
    assert_eq!(after_mul.state["value"], json!(18));
}

#[tokio::test]
async fn reset_ignores_params_and_zeroes_the_value() {
    let state = serde_json::Map::from_iter([("value".into(), json!(42))]);
    let outcome = Reset.run(&Instruction::new("reset"), &state).await.unwrap();
    assert_eq!(outcome.state["value"], json!(0));
}

#[tokio::test]
async fn add_without_a_by_param_reports_an_invalid_instruction() {
    let state = serde_json::Map::new();
    let err = Add.run(&Instruction::new("add"), &state).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInstruction { .. }));
}
