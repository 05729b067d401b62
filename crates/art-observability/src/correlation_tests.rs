// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

#[test]
fn context_for_signal_copies_correlation_fields() {
    let signal = Signal::new("art.agent.cmd.stop", json!(null));
    let ctx = context_for_signal(&signal);
    assert_eq!(ctx.trace_id, signal.trace_id);
    assert_eq!(ctx.span_id, signal.span_id);
}

#[test]
fn stamp_signal_overwrites_trace_fields() {
    let mut signal = Signal::new("art.agent.cmd.stop", json!(null));
    let ctx = TracerContext::root("new-trace", "new-span");
    stamp_signal(&mut signal, &ctx);
    assert_eq!(signal.trace_id, "new-trace");
    assert_eq!(signal.span_id, "new-span");
}
