// SPDX-License-Identifier: MIT

//! The instance manager: one logical key maps to one running agent
//! server, started on demand, thawed from storage if a checkpoint
//! exists, and hibernated back to storage after an idle timeout.

use crate::checkpoint::{Checkpoint, ThreadRef};
use crate::error::InstanceError;
use crate::storage::StorageAdapter;
use art_core::action::Action;
use art_core::clock::{Clock, SystemClock};
use art_core::schema::Schema;
use art_observability::ObservabilityConfig;
use art_server::{AgentServer, Hibernator, ServerError, StartOpts};
use art_signal::{Dispatcher, LoggerDispatcher};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Fixed configuration shared by every instance a manager starts:
/// agent class (schema + registered actions), dispatch sink, queueing
/// limits, and the optional persistence/idle-timeout policy.
pub struct InstanceConfig {
    pub agent_class: String,
    pub schema: Schema,
    pub actions: Vec<Arc<dyn Action>>,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub max_queue_size: usize,
    pub idle_timeout: Option<Duration>,
    pub storage: Option<Arc<dyn StorageAdapter>>,
    pub clock: Arc<dyn Clock>,
    /// Shared across every instance this manager starts, so a
    /// per-instance debug override (keyed by instance key) or a
    /// global one reaches every agent server it spawns.
    pub observability: Arc<ObservabilityConfig>,
}

impl InstanceConfig {
    pub fn new(agent_class: impl Into<String>, schema: Schema) -> Self {
        Self {
            agent_class: agent_class.into(),
            schema,
            actions: Vec::new(),
            dispatcher: Arc::new(LoggerDispatcher::new("instance_manager")),
            max_queue_size: 128,
            idle_timeout: None,
            storage: None,
            clock: Arc::new(SystemClock),
            observability: Arc::new(ObservabilityConfig::new()),
        }
    }

    pub fn action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn observability(mut self, observability: Arc<ObservabilityConfig>) -> Self {
        self.observability = observability;
        self
    }
}

struct ManagedAgent {
    server: AgentServer,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceStats {
    pub count: usize,
}

struct Inner {
    registry: parking_lot::RwLock<HashMap<String, ManagedAgent>>,
    idle_since: parking_lot::Mutex<HashMap<String, Instant>>,
    config: InstanceConfig,
    reaper_cancel: CancellationToken,
}

/// A cheap, cloneable handle over the shared registry and its reaper task.
#[derive(Clone)]
pub struct InstanceManager {
    inner: Arc<Inner>,
}

impl InstanceManager {
    pub fn new(config: InstanceConfig) -> Self {
        let idle_timeout = config.idle_timeout;
        let inner = Arc::new(Inner {
            registry: parking_lot::RwLock::new(HashMap::new()),
            idle_since: parking_lot::Mutex::new(HashMap::new()),
            config,
            reaper_cancel: CancellationToken::new(),
        });

        if let Some(idle_timeout) = idle_timeout {
            tokio::spawn(reap_loop(inner.clone(), idle_timeout));
        }

        Self { inner }
    }

    /// Look up `key` without starting anything.
    pub fn lookup(&self, key: &str) -> Option<AgentServer> {
        self.inner.registry.read().get(key).map(|managed| managed.server.clone())
    }

    /// Look up `key`, starting (or thawing) an agent if none is running.
    pub async fn get(
        &self,
        key: &str,
        initial_state: Option<serde_json::Map<String, Value>>,
    ) -> Result<AgentServer, InstanceError> {
        if let Some(server) = self.lookup(key) {
            self.inner.idle_since.lock().remove(key);
            server.attach().await?;
            return Ok(server);
        }

        let started = self.start_new(key, initial_state).await?;

        let server = {
            let mut registry = self.inner.registry.write();
            match registry.get(key) {
                // Lost the race to another `get` — the extra server we just
                // started has no other referent and winds down on its own.
                Some(existing) => existing.server.clone(),
                None => {
                    registry.insert(key.to_string(), ManagedAgent { server: started.clone() });
                    started
                }
            }
        };

        self.inner.idle_since.lock().remove(key);
        server.attach().await?;
        Ok(server)
    }

    /// Graceful stop: hibernates (if storage is configured) and removes `key`.
    pub async fn stop(&self, key: &str) -> Result<(), InstanceError> {
        let managed = self.inner.registry.write().remove(key);
        let managed = managed.ok_or_else(|| InstanceError::NotFound { key: key.to_string() })?;
        self.inner.idle_since.lock().remove(key);
        hibernate(&self.inner.config, key, &managed.server).await
    }

    pub fn stats(&self) -> InstanceStats {
        InstanceStats { count: self.inner.registry.read().len() }
    }

    async fn start_new(
        &self,
        key: &str,
        initial_state: Option<serde_json::Map<String, Value>>,
    ) -> Result<AgentServer, InstanceError> {
        let (id, resolved_state) = match &self.inner.config.storage {
            Some(storage) => match storage.get_checkpoint(key).await? {
                Some(checkpoint) => {
                    if let Some(thread_ref) = &checkpoint.thread {
                        verify_thread(storage.as_ref(), key, thread_ref).await?;
                    }
                    (Some(checkpoint.id), Some(checkpoint.state))
                }
                None => (Some(key.to_string()), initial_state),
            },
            None => (Some(key.to_string()), initial_state),
        };

        let mut opts = StartOpts::new(self.inner.config.schema.clone())
            .dispatcher(self.inner.config.dispatcher.clone())
            .max_queue_size(self.inner.config.max_queue_size)
            .instance_name(key)
            .observability(self.inner.config.observability.clone());
        opts.id = id;
        opts.clock = self.inner.config.clock.clone();
        if let Some(state) = resolved_state {
            opts = opts.initial_state(state);
        }
        for action in &self.inner.config.actions {
            opts = opts.action(action.clone());
        }

        if let Some(storage) = &self.inner.config.storage {
            let hibernator: Arc<dyn Hibernator> =
                Arc::new(StorageHibernator::new(storage.clone(), key, self.inner.config.agent_class.clone()));
            opts = opts.hibernator(hibernator);
        }

        AgentServer::start(opts).map_err(InstanceError::from)
    }
}

/// Confirms the thread a checkpoint points at is still there and at
/// the revision the checkpoint expects, without pulling its entries
/// into the resumed agent — a checkpoint's `state` is already the
/// thread folded forward, so thawing only needs the thread to exist
/// and line up, not to be replayed.
async fn verify_thread(storage: &dyn StorageAdapter, key: &str, thread_ref: &ThreadRef) -> Result<(), InstanceError> {
    let thread = storage
        .load_thread(&thread_ref.id)
        .await?
        .ok_or_else(|| InstanceError::MissingThread { key: key.to_string(), thread_id: thread_ref.id.clone() })?;
    if thread.rev != thread_ref.rev {
        return Err(InstanceError::ThreadMismatch {
            key: key.to_string(),
            thread_id: thread_ref.id.clone(),
            wanted: thread_ref.rev,
            found: thread.rev,
        });
    }
    Ok(())
}

/// Writes `state` as `key`'s checkpoint, appending `new_thread_entries`
/// to its thread (named after the agent's own id) when there are any,
/// and otherwise carrying the previous checkpoint's thread pointer
/// forward untouched.
async fn persist_checkpoint(
    storage: &dyn StorageAdapter,
    key: &str,
    agent_class: &str,
    agent_id: &str,
    state: &serde_json::Map<String, Value>,
    new_thread_entries: Vec<Value>,
) -> Result<(), InstanceError> {
    let mut checkpoint = Checkpoint::new(agent_class, agent_id, state.clone());
    checkpoint.thread = if new_thread_entries.is_empty() {
        storage.get_checkpoint(key).await?.and_then(|previous| previous.thread)
    } else {
        let rev = storage.append_thread(agent_id, new_thread_entries).await?;
        Some(ThreadRef { id: agent_id.to_string(), rev })
    };
    storage.put_checkpoint(key, &checkpoint).await
}

async fn hibernate(config: &InstanceConfig, key: &str, server: &AgentServer) -> Result<(), InstanceError> {
    let Some(storage) = &config.storage else {
        return Ok(());
    };
    let state = server.state().await?;
    persist_checkpoint(
        storage.as_ref(),
        key,
        &config.agent_class,
        &state.agent.id.to_string(),
        &state.agent.state,
        state.thread_log.clone(),
    )
    .await
}

/// Bridges a [`StorageAdapter`] onto [`art_server::Hibernator`] so an
/// agent can hibernate itself from inside its own actor task on
/// `Stop`, the same way [`InstanceManager::stop`] and the idle reaper
/// hibernate it from the outside.
struct StorageHibernator {
    storage: Arc<dyn StorageAdapter>,
    key: String,
    agent_class: String,
}

impl StorageHibernator {
    fn new(storage: Arc<dyn StorageAdapter>, key: impl Into<String>, agent_class: impl Into<String>) -> Self {
        Self { storage, key: key.into(), agent_class: agent_class.into() }
    }
}

#[async_trait]
impl Hibernator for StorageHibernator {
    async fn hibernate(
        &self,
        agent_id: &str,
        state: &serde_json::Map<String, Value>,
        thread_log: &[Value],
    ) -> Result<(), ServerError> {
        persist_checkpoint(self.storage.as_ref(), &self.key, &self.agent_class, agent_id, state, thread_log.to_vec())
            .await
            .map_err(|err| ServerError::Hibernation { reason: err.to_string() })
    }
}

async fn reap_loop(inner: Arc<Inner>, idle_timeout: Duration) {
    let tick = (idle_timeout / 4).clamp(Duration::from_millis(10), Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = inner.reaper_cancel.cancelled() => break,
            _ = tokio::time::sleep(tick) => {}
        }

        let snapshot: Vec<(String, AgentServer)> =
            inner.registry.read().iter().map(|(key, managed)| (key.clone(), managed.server.clone())).collect();

        for (key, server) in snapshot {
            let Ok(state) = server.state().await else { continue };

            if state.attachment_count > 0 {
                inner.idle_since.lock().remove(&key);
                continue;
            }

            let now = inner.config.clock.now();
            let expired = {
                let mut idle_since = inner.idle_since.lock();
                match idle_since.get(&key) {
                    Some(since) => now.duration_since(*since) >= idle_timeout,
                    None => {
                        idle_since.insert(key.clone(), now);
                        false
                    }
                }
            };

            if expired {
                inner.idle_since.lock().remove(&key);
                let managed = inner.registry.write().remove(&key);
                if let Some(managed) = managed {
                    match hibernate(&inner.config, &key, &managed.server).await {
                        Ok(()) => tracing::info!(key = %key, "agent hibernated after idle timeout"),
                        Err(err) => tracing::warn!(key = %key, error = %err, "idle hibernation failed"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
