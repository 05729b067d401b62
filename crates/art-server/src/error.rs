// SPDX-License-Identifier: MIT

use art_core::error::{CoreError, ErrorKind};
use art_signal::SignalError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum ServerError {
    #[error("signal queue is full (size {size})")]
    QueueOverflow { size: usize },

    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("reply to signal {signal_id} timed out")]
    ReplyTimeout { signal_id: String },

    #[error("child {child_id} not found")]
    ChildNotFound { child_id: String },

    #[error("server is stopped")]
    Stopped,

    /// `StartOpts::id` didn't fit an `AgentId`'s inline buffer — most
    /// likely a checkpoint id that was corrupted or written by a
    /// different id scheme than this one.
    #[error("id `{id}` cannot be used as an agent id")]
    InvalidId { id: String },

    /// A configured [`crate::hibernate::Hibernator`] failed. Logged and
    /// swallowed by `shutdown()` rather than propagated, since a failed
    /// hibernation shouldn't block the actor from exiting — surfaced
    /// here so `Hibernator` implementations have a concrete error type
    /// to report through.
    #[error("hibernation failed: {reason}")]
    Hibernation { reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::QueueOverflow { .. } => ErrorKind::Queue,
            ServerError::InvalidTransition { .. } => ErrorKind::Execution,
            ServerError::ReplyTimeout { .. } => ErrorKind::Transport,
            ServerError::ChildNotFound { .. } => ErrorKind::Directive,
            ServerError::Stopped => ErrorKind::Execution,
            ServerError::InvalidId { .. } => ErrorKind::Validation,
            ServerError::Hibernation { .. } => ErrorKind::Transport,
            ServerError::Core(err) => err.kind(),
            ServerError::Signal(err) => err.kind(),
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
