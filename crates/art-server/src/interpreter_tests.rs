// SPDX-License-Identifier: MIT

use super::*;
use art_core::clock::FakeClock;
use art_core::directive::{ChildSpec, SpawnAgentOpts};
use art_core::instruction::Instruction;
use art_core::schema::Schema;
use art_core::signal::Signal;
use art_observability::{DebugConfig, ObservabilityConfig};
use art_signal::LoggerDispatcher;
use serde_json::json;

fn fresh_state() -> ServerState {
    ServerState::new(
        art_core::agent_value::AgentValue::new(None, Schema::new(), None),
        16,
        DebugConfig { ring_buffer_size: 10, ..DebugConfig::default() },
        Arc::new(ObservabilityConfig::new()),
    )
}

fn dispatcher() -> Arc<dyn Dispatcher> {
    Arc::new(LoggerDispatcher::new("test"))
}

fn causing() -> Signal {
    Signal::new("art.agent.cmd.run", json!(null))
}

#[tokio::test]
async fn emit_dispatches_without_mutating_state() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::emit(json!({"x": 1}))];
    let outcome = apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert!(outcome.scheduled.is_empty());
    assert!(outcome.stop_requested.is_none());
}

#[tokio::test]
async fn emit_stamps_the_emitted_signal_with_the_causing_signals_correlation() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let (dispatcher, mut captured) = art_signal::ChannelDispatcher::new("test", 4);
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(dispatcher);
    let cause = causing();

    let child = Signal::new("art.agent.evt.emitted", json!({"note": "child"}));
    let directives = vec![Directive::Emit { signal: child }];
    apply_directives(&mut state, directives, &cause, &dispatcher, &clock).await.unwrap();

    let dispatched = captured.try_recv().expect("emitted signal dispatched");
    assert_eq!(dispatched.trace_id, cause.trace_id);
    assert_eq!(dispatched.correlation_id, cause.correlation_id);
    assert_eq!(dispatched.parent_span_id.as_deref(), Some(cause.span_id.as_str()));
    assert_eq!(dispatched.causation_id.as_deref(), Some(cause.id.to_string().as_str()));
}

#[tokio::test]
async fn enqueue_appends_to_agent_pending_instructions() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::Enqueue { instruction: Instruction::new("tick") }];
    apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert_eq!(state.agent.pending_instructions.len(), 1);
}

#[tokio::test]
async fn state_modification_set_creates_intermediate_maps() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::set_path("a.b.c", json!(42))];
    apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert_eq!(state.runtime_state["a"]["b"]["c"], json!(42));
}

#[tokio::test]
async fn state_modification_delete_is_noop_when_absent() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::delete_path("missing.path")];
    apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert!(state.runtime_state.is_empty());
}

#[tokio::test]
async fn state_modification_update_deep_merges_objects() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    apply_directives(&mut state, vec![Directive::set_path("cfg", json!({"a": 1}))], &causing(), &dispatcher(), &clock)
        .await
        .unwrap();
    apply_directives(
        &mut state,
        vec![Directive::StateModification { op: StateOp::Update, path: "cfg".into(), value: json!({"b": 2}) }],
        &causing(),
        &dispatcher(),
        &clock,
    )
    .await
    .unwrap();
    assert_eq!(state.runtime_state["cfg"], json!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn spawn_agent_registers_child() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let opts = SpawnAgentOpts { agent_class: "worker".into(), id: Some("w1".into()), initial_state: Default::default() };
    apply_directives(&mut state, vec![Directive::SpawnAgent { opts }], &causing(), &dispatcher(), &clock).await.unwrap();
    assert!(state.children.contains_key("w1"));
}

#[tokio::test]
async fn stop_child_on_missing_id_is_noop() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let result = apply_directives(
        &mut state,
        vec![Directive::StopChild { child_id: "ghost".into() }],
        &causing(),
        &dispatcher(),
        &clock,
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn stop_short_circuits_remaining_directives() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![
        Directive::set_path("before", json!(true)),
        Directive::stop("shutting down"),
        Directive::set_path("after", json!(true)),
    ];
    let outcome = apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert_eq!(outcome.stop_requested.as_deref(), Some("shutting down"));
    assert_eq!(state.runtime_state.get("before"), Some(&json!(true)));
    assert!(state.runtime_state.get("after").is_none());
}

#[tokio::test]
async fn schedule_collects_into_outcome_without_firing() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::schedule(500, Signal::new("a.b", json!(null)))];
    let outcome = apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap();
    assert_eq!(outcome.scheduled.len(), 1);
    assert_eq!(outcome.scheduled[0].0, 500);
}

#[tokio::test]
async fn scheduled_signals_also_inherit_the_causing_signals_correlation() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let cause = causing();
    let directives = vec![Directive::schedule(500, Signal::new("a.b", json!(null)))];
    let outcome = apply_directives(&mut state, directives, &cause, &dispatcher(), &clock).await.unwrap();
    assert_eq!(outcome.scheduled[0].1.trace_id, cause.trace_id);
    assert_eq!(outcome.scheduled[0].1.causation_id.as_deref(), Some(cause.id.to_string().as_str()));
}

#[tokio::test]
async fn error_directive_aborts_interpretation() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let directives = vec![Directive::Error { reason: "bad state".into() }];
    let err = apply_directives(&mut state, directives, &causing(), &dispatcher(), &clock).await.unwrap_err();
    assert!(matches!(err, crate::error::ServerError::Core(_)));
}

#[tokio::test]
async fn spawn_generic_child_records_label() {
    let mut state = fresh_state();
    let clock = FakeClock::new();
    let spec = ChildSpec { child_id: "c1".into(), args: Default::default() };
    apply_directives(&mut state, vec![Directive::Spawn { spec }], &causing(), &dispatcher(), &clock).await.unwrap();
    assert_eq!(state.children["c1"].label, "generic");
}
