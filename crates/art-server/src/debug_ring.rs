// SPDX-License-Identifier: MIT

//! Bounded newest-first ring buffer of debug events for one agent server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugEvent {
    pub at_epoch_ms: u64,
    pub kind: String,
    pub detail: Value,
}

#[derive(Debug, Clone)]
pub struct DebugRing {
    events: VecDeque<DebugEvent>,
    capacity: usize,
}

impl DebugRing {
    pub fn new(capacity: usize) -> Self {
        Self { events: VecDeque::with_capacity(capacity.min(1024)), capacity }
    }

    pub fn push(&mut self, event: DebugEvent) {
        if self.capacity == 0 {
            return;
        }
        self.events.push_front(event);
        while self.events.len() > self.capacity {
            self.events.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Newest-first snapshot, capped at `limit` (or all events if `None`).
    pub fn recent(&self, limit: Option<usize>) -> Vec<DebugEvent> {
        let take = limit.unwrap_or(self.events.len());
        self.events.iter().take(take).cloned().collect()
    }
}

#[cfg(test)]
#[path = "debug_ring_tests.rs"]
mod tests;
