// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn not_found_maps_to_queue_kind() {
    let err = InstanceError::NotFound { key: "user-1".into() };
    assert_eq!(err.kind(), ErrorKind::Queue);
}

#[test]
fn thread_mismatch_maps_to_config_kind() {
    let err = InstanceError::ThreadMismatch { key: "user-1".into(), thread_id: "t1".into(), wanted: 2, found: 1 };
    assert_eq!(err.kind(), ErrorKind::Config);
}
