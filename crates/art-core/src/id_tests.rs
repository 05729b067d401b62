// SPDX-License-Identifier: MIT

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn new_has_fixed_width() {
    let id = TestId::new();
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
    assert!(id.as_str().starts_with("tst-"));
}

#[test]
fn new_ids_are_unique() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.as_str(), "tst-abc");
    assert_eq!(id.suffix(), "abc");
}

#[test]
fn checked_from_string_accepts_ids_within_the_inline_buffer() {
    let id = TestId::checked_from_string("tst-abc").expect("fits");
    assert_eq!(id.as_str(), "tst-abc");
}

#[test]
fn checked_from_string_rejects_ids_that_would_be_truncated() {
    let oversized = format!("tst-{}", "x".repeat(ID_MAX_LEN));
    assert!(TestId::checked_from_string(oversized).is_none());
}

#[test]
fn hash_map_lookup_by_borrowed_str() {
    let mut map = HashMap::new();
    map.insert(TestId::from_string("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
}

#[test]
fn display_matches_as_str() {
    let id = TestId::from_string("tst-xyz");
    assert_eq!(format!("{id}"), "tst-xyz");
}

#[test]
fn serde_round_trips() {
    let id = TestId::from_string("tst-abc");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"tst-abc\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
