// SPDX-License-Identifier: MIT

//! An in-memory [`StorageAdapter`], for tests and ephemeral instances
//! that don't need to survive a process restart.

use crate::checkpoint::{Checkpoint, Thread};
use crate::error::InstanceError;
use crate::storage::StorageAdapter;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryStorageAdapter {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
    threads: RwLock<HashMap<String, Thread>>,
}

impl InMemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorageAdapter {
    async fn put_checkpoint(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), InstanceError> {
        self.checkpoints.write().insert(key.to_string(), checkpoint.clone());
        Ok(())
    }

    async fn get_checkpoint(&self, key: &str) -> Result<Option<Checkpoint>, InstanceError> {
        Ok(self.checkpoints.read().get(key).cloned())
    }

    async fn delete_checkpoint(&self, key: &str) -> Result<(), InstanceError> {
        self.checkpoints.write().remove(key);
        Ok(())
    }

    async fn append_thread(&self, id: &str, entries: Vec<Value>) -> Result<u64, InstanceError> {
        let mut threads = self.threads.write();
        let thread = threads.entry(id.to_string()).or_insert_with(|| Thread { id: id.to_string(), rev: 0, entries: Vec::new() });
        thread.entries.extend(entries);
        thread.rev += 1;
        Ok(thread.rev)
    }

    async fn load_thread(&self, id: &str) -> Result<Option<Thread>, InstanceError> {
        Ok(self.threads.read().get(id).cloned())
    }
}

#[cfg(test)]
#[path = "memory_storage_tests.rs"]
mod tests;
