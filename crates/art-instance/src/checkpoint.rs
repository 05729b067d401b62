// SPDX-License-Identifier: MIT

//! The persisted checkpoint shape: an agent value's state plus a
//! pointer to its append-only thread, never the thread itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CHECKPOINT_VERSION: u32 = 1;

/// A reference to an append-only thread, addressed by id and read
/// back up to a known revision. Stored inline in a [`Checkpoint`]
/// instead of the thread's entries, which would make checkpoints grow
/// without bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    pub id: String,
    pub rev: u64,
}

/// What gets written by `put_checkpoint` and read back by `get_checkpoint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub agent_class: String,
    pub id: String,
    pub state: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadRef>,
}

impl Checkpoint {
    pub fn new(agent_class: impl Into<String>, id: impl Into<String>, state: serde_json::Map<String, Value>) -> Self {
        Self { version: CHECKPOINT_VERSION, agent_class: agent_class.into(), id: id.into(), state, thread: None }
    }

    pub fn with_thread(mut self, thread: ThreadRef) -> Self {
        self.thread = Some(thread);
        self
    }
}

/// An append-only log of entries addressed by [`ThreadRef::id`], read
/// back in full up to the checkpoint's recorded revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub rev: u64,
    pub entries: Vec<Value>,
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
