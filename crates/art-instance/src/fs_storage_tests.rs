// SPDX-License-Identifier: MIT

use super::*;
use crate::checkpoint::Checkpoint;
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn round_trips_a_checkpoint_through_disk() {
    let dir = tempdir().unwrap();
    let storage = FilesystemStorageAdapter::new(dir.path()).unwrap();
    let checkpoint = Checkpoint::new("counter", "agt-1", serde_json::Map::from_iter([("count".into(), json!(7))]));
    storage.put_checkpoint("user-1", &checkpoint).await.unwrap();

    let loaded = storage.get_checkpoint("user-1").await.unwrap();
    assert_eq!(loaded, Some(checkpoint));
}

#[tokio::test]
async fn two_consecutive_writes_of_the_same_checkpoint_produce_identical_bytes() {
    let dir = tempdir().unwrap();
    let storage = FilesystemStorageAdapter::new(dir.path()).unwrap();
    let checkpoint = Checkpoint::new("counter", "agt-1", serde_json::Map::from_iter([("count".into(), json!(7))]));

    storage.put_checkpoint("user-1", &checkpoint).await.unwrap();
    let first = std::fs::read(storage.checkpoint_path("user-1")).unwrap();
    storage.put_checkpoint("user-1", &checkpoint).await.unwrap();
    let second = std::fs::read(storage.checkpoint_path("user-1")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_checkpoint_is_none() {
    let dir = tempdir().unwrap();
    let storage = FilesystemStorageAdapter::new(dir.path()).unwrap();
    assert!(storage.get_checkpoint("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_checkpoint_is_idempotent() {
    let dir = tempdir().unwrap();
    let storage = FilesystemStorageAdapter::new(dir.path()).unwrap();
    storage.delete_checkpoint("never-written").await.unwrap();
}

#[tokio::test]
async fn thread_entries_accumulate_across_appends() {
    let dir = tempdir().unwrap();
    let storage = FilesystemStorageAdapter::new(dir.path()).unwrap();
    storage.append_thread("th-1", vec![json!("a")]).await.unwrap();
    let rev = storage.append_thread("th-1", vec![json!("b")]).await.unwrap();
    assert_eq!(rev, 2);

    let thread = storage.load_thread("th-1").await.unwrap().expect("thread exists");
    assert_eq!(thread.entries, vec![json!("a"), json!("b")]);
}
