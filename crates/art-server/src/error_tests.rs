// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn queue_overflow_maps_to_queue_kind() {
    let err = ServerError::QueueOverflow { size: 10 };
    assert_eq!(err.kind(), ErrorKind::Queue);
}

#[test]
fn core_error_kind_passes_through() {
    let err = ServerError::from(CoreError::ActionFailed {
        agent_id: "a1".into(),
        action: "tick".into(),
        reason: "boom".into(),
    });
    assert_eq!(err.kind(), ErrorKind::Execution);
}
