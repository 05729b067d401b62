// SPDX-License-Identifier: MIT

//! The hibernation seam: how a running agent server persists itself
//! when it decides to stop. `InstanceManager::stop` hibernates a
//! server it already has a handle to by asking for its state over the
//! command channel, but an agent hibernating itself from inside
//! `run_actor` on `Directive::Stop` cannot make that same round-trip
//! — it *is* the task that would have to answer it. A `Hibernator`
//! lets the actor persist in place instead.

use crate::error::ServerError;
use async_trait::async_trait;
use serde_json::Value;

/// Persists an agent's final state and append-only thread log.
/// Implemented by `art-instance`'s `StorageHibernator`, which bridges
/// onto a `StorageAdapter`; tests may supply their own to observe
/// shutdown without a real storage backend.
#[async_trait]
pub trait Hibernator: Send + Sync {
    async fn hibernate(
        &self,
        agent_id: &str,
        state: &serde_json::Map<String, Value>,
        thread_log: &[Value],
    ) -> Result<(), ServerError>;
}

#[cfg(test)]
#[path = "hibernate_tests.rs"]
mod tests;
