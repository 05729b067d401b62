// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

#[test]
fn param_reads_from_params_map() {
    let mut params = serde_json::Map::new();
    params.insert("amount".into(), json!(5));
    let instr = Instruction::new("deposit").with_params(params);
    assert_eq!(instr.param("amount"), Some(&json!(5)));
    assert_eq!(instr.param("missing"), None);
}

#[test]
fn new_starts_with_empty_maps() {
    let instr = Instruction::new("noop");
    assert!(instr.params.is_empty());
    assert!(instr.context.is_empty());
}
