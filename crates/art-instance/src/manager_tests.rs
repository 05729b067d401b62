// SPDX-License-Identifier: MIT

use super::*;
use crate::checkpoint::{Checkpoint, ThreadRef};
use crate::memory_storage::InMemoryStorageAdapter;
use crate::storage::StorageAdapter;
use art_core::action::{Action, ActionOutcome};
use art_core::instruction::Instruction;
use art_core::schema::{FieldSpec, FieldType};
use art_core::signal::Signal;
use art_observability::{DebugConfig, DebugLevel};
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
    ) -> Result<ActionOutcome, art_core::error::CoreError> {
        let by = instruction.param("by").and_then(Value::as_i64).unwrap_or(1);
        let current = state.get("count").and_then(Value::as_i64).unwrap_or(0);
        let mut next = state.clone();
        next.insert("count".into(), json!(current + by));
        Ok(ActionOutcome::new(next))
    }
}

fn counter_schema() -> Schema {
    Schema::new().field(FieldSpec::new("count", FieldType::Integer).default(json!(0)))
}

fn increment_signal(by: i64) -> Signal {
    let instruction = Instruction::new("increment").with_params(serde_json::Map::from_iter([("by".into(), json!(by))]));
    Signal::new("art.agent.cmd.run", serde_json::to_value(&instruction).unwrap())
}

#[tokio::test]
async fn get_starts_a_fresh_agent_for_an_unknown_key() {
    let config = InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment));
    let manager = InstanceManager::new(config);

    let server = manager.get("user-1", None).await.expect("get succeeds");
    server.call(increment_signal(3), Duration::from_secs(1)).await.expect("call succeeds");

    let state = server.state().await.expect("state readable");
    assert_eq!(state.agent.state["count"], json!(3));
    assert_eq!(manager.stats().count, 1);
}

#[tokio::test]
async fn get_reuses_the_running_handle_for_the_same_key() {
    let config = InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment));
    let manager = InstanceManager::new(config);

    let first = manager.get("user-1", None).await.expect("get succeeds");
    first.call(increment_signal(2), Duration::from_secs(1)).await.expect("call succeeds");

    let second = manager.get("user-1", None).await.expect("get succeeds again");
    let state = second.state().await.expect("state readable");
    assert_eq!(state.agent.state["count"], json!(2));
    assert_eq!(manager.stats().count, 1);
}

#[tokio::test]
async fn a_per_instance_debug_override_is_resolved_by_key_on_start() {
    let observability = Arc::new(ObservabilityConfig::new());
    observability.set_instance("user-1", DebugConfig { log_level: DebugLevel::Verbose, ..DebugConfig::default() });

    let config = InstanceConfig::new("counter", counter_schema())
        .action(Arc::new(Increment))
        .observability(observability.clone());
    let manager = InstanceManager::new(config);

    let known = manager.get("user-1", None).await.expect("get succeeds");
    let other = manager.get("user-2", None).await.expect("get succeeds");

    assert_eq!(known.state().await.expect("state readable").debug_config.log_level, DebugLevel::Verbose);
    assert_eq!(other.state().await.expect("state readable").debug_config.log_level, DebugLevel::Off);
}

#[tokio::test]
async fn stop_of_an_unknown_key_reports_not_found() {
    let config = InstanceConfig::new("counter", counter_schema());
    let manager = InstanceManager::new(config);

    let err = manager.stop("ghost").await.unwrap_err();
    assert!(matches!(err, InstanceError::NotFound { .. }));
}

#[tokio::test]
async fn stop_without_storage_configured_just_drops_the_entry() {
    let config = InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment));
    let manager = InstanceManager::new(config);

    manager.get("user-1", None).await.expect("get succeeds");
    manager.stop("user-1").await.expect("stop succeeds even without storage");
    assert!(manager.lookup("user-1").is_none());
}

#[tokio::test]
async fn stop_hibernates_and_a_later_get_thaws_the_checkpoint() {
    let storage = Arc::new(InMemoryStorageAdapter::new());
    let config =
        InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment)).storage(storage.clone());
    let manager = InstanceManager::new(config);

    let first = manager.get("user-1", None).await.expect("get succeeds");
    first.call(increment_signal(7), Duration::from_secs(1)).await.expect("call succeeds");
    manager.stop("user-1").await.expect("stop succeeds");
    assert!(manager.lookup("user-1").is_none());

    let second = manager.get("user-1", None).await.expect("get thaws checkpoint");
    let state = second.state().await.expect("state readable");
    assert_eq!(state.agent.state["count"], json!(7));
}

#[tokio::test]
async fn stop_appends_processed_instructions_to_a_thread_and_points_the_checkpoint_at_it() {
    let storage = Arc::new(InMemoryStorageAdapter::new());
    let config =
        InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment)).storage(storage.clone());
    let manager = InstanceManager::new(config);

    let server = manager.get("user-1", None).await.expect("get succeeds");
    server.call(increment_signal(1), Duration::from_secs(1)).await.expect("call succeeds");
    server.call(increment_signal(1), Duration::from_secs(1)).await.expect("call succeeds");
    manager.stop("user-1").await.expect("stop succeeds");

    let checkpoint = storage.get_checkpoint("user-1").await.unwrap().expect("checkpoint persisted");
    let thread_ref = checkpoint.thread.expect("two processed instructions leave a thread behind");
    let thread = storage.load_thread(&thread_ref.id).await.unwrap().expect("thread persisted");
    assert_eq!(thread.rev, thread_ref.rev);
    assert_eq!(thread.entries.len(), 2);
}

#[tokio::test]
async fn a_thread_missing_from_storage_fails_the_thaw() {
    let storage = Arc::new(InMemoryStorageAdapter::new());
    let checkpoint = Checkpoint::new("counter", "user-1", serde_json::Map::new())
        .with_thread(ThreadRef { id: "ghost-thread".into(), rev: 1 });
    storage.put_checkpoint("user-1", &checkpoint).await.unwrap();

    let config =
        InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment)).storage(storage.clone());
    let manager = InstanceManager::new(config);

    let err = manager.get("user-1", None).await.unwrap_err();
    assert!(matches!(err, InstanceError::MissingThread { .. }));
}

#[tokio::test]
async fn a_thread_revision_behind_the_checkpoint_fails_the_thaw() {
    let storage = Arc::new(InMemoryStorageAdapter::new());
    storage.append_thread("counter-thread", vec![json!({"step": 1})]).await.unwrap();
    let checkpoint = Checkpoint::new("counter", "user-1", serde_json::Map::new())
        .with_thread(ThreadRef { id: "counter-thread".into(), rev: 2 });
    storage.put_checkpoint("user-1", &checkpoint).await.unwrap();

    let config =
        InstanceConfig::new("counter", counter_schema()).action(Arc::new(Increment)).storage(storage.clone());
    let manager = InstanceManager::new(config);

    let err = manager.get("user-1", None).await.unwrap_err();
    assert!(matches!(err, InstanceError::ThreadMismatch { .. }));
}

#[tokio::test]
async fn idle_timeout_hibernates_an_agent_once_its_attachment_count_reaches_zero() {
    let storage = Arc::new(InMemoryStorageAdapter::new());
    let config = InstanceConfig::new("counter", counter_schema())
        .action(Arc::new(Increment))
        .storage(storage.clone())
        .idle_timeout(Duration::from_millis(30));
    let manager = InstanceManager::new(config);

    let server = manager.get("user-1", None).await.expect("get succeeds");
    server.call(increment_signal(4), Duration::from_secs(1)).await.expect("call succeeds");
    server.detach().await.expect("detach succeeds");

    let mut waited = Duration::ZERO;
    while manager.lookup("user-1").is_some() && waited < Duration::from_millis(1000) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    assert!(manager.lookup("user-1").is_none(), "agent should have been reaped after idle timeout");
    let checkpoint = storage.get_checkpoint("user-1").await.unwrap().expect("checkpoint persisted");
    assert_eq!(checkpoint.state["count"], json!(4));
}
