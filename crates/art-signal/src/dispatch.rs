// SPDX-License-Identifier: MIT

//! Output sinks for routed signals.

use crate::error::SignalError;
use art_core::signal::Signal;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A sink that accepts dispatched signals. Dispatch is fire-and-forget
/// from the directive interpreter's point of view: a failure is
/// logged and counted, never propagated as a pipeline error.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn dispatch(&self, signal: Signal) -> Result<(), SignalError>;
}

/// Logs every dispatched signal at `info` (or `debug` for terse
/// high-frequency types) via `tracing`, never failing.
#[derive(Debug, Clone, Default)]
pub struct LoggerDispatcher {
    name: String,
}

impl LoggerDispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Dispatcher for LoggerDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dispatch(&self, signal: Signal) -> Result<(), SignalError> {
        tracing::info!(
            sink = %self.name,
            signal_type = %signal.signal_type,
            signal_id = %signal.id,
            correlation_id = %signal.correlation_id,
            "signal dispatched"
        );
        Ok(())
    }
}

/// Forwards dispatched signals onto a bounded `tokio::mpsc` channel,
/// for callers that want to observe or further process output
/// signals asynchronously. Counts (but does not fail on) drops caused
/// by a full or closed channel.
#[derive(Clone)]
pub struct ChannelDispatcher {
    name: String,
    sender: tokio::sync::mpsc::Sender<Signal>,
    dropped: Arc<AtomicU64>,
}

impl ChannelDispatcher {
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, tokio::sync::mpsc::Receiver<Signal>) {
        let (sender, receiver) = tokio::sync::mpsc::channel(capacity);
        (Self { name: name.into(), sender, dropped: Arc::new(AtomicU64::new(0)) }, receiver)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Dispatcher for ChannelDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dispatch(&self, signal: Signal) -> Result<(), SignalError> {
        match self.sender.try_send(signal) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(SignalError::DispatchFailed { sink: self.name.clone(), reason: err.to_string() })
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
