// SPDX-License-Identifier: MIT

//! The pluggable persistence seam: where a checkpoint and its thread
//! are written and read back from.

use crate::checkpoint::{Checkpoint, Thread};
use crate::error::InstanceError;
use async_trait::async_trait;
use serde_json::Value;

/// Storage for agent checkpoints and their append-only threads. A key
/// identifies one logical instance; implementations are expected to
/// serialize their own writes per key.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn put_checkpoint(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), InstanceError>;

    async fn get_checkpoint(&self, key: &str) -> Result<Option<Checkpoint>, InstanceError>;

    async fn delete_checkpoint(&self, key: &str) -> Result<(), InstanceError>;

    /// Append `entries` to thread `id`, returning the thread's new revision.
    async fn append_thread(&self, id: &str, entries: Vec<Value>) -> Result<u64, InstanceError>;

    async fn load_thread(&self, id: &str) -> Result<Option<Thread>, InstanceError>;
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
