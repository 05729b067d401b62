// SPDX-License-Identifier: MIT

//! Errors from the instance registry and the storage adapters it drives.

use art_core::error::ErrorKind;
use art_server::ServerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum InstanceError {
    #[error("no instance registered for key `{key}`")]
    NotFound { key: String },

    #[error("thread `{thread_id}` referenced by checkpoint for `{key}` is missing")]
    MissingThread { key: String, thread_id: String },

    #[error("thread `{thread_id}` revision mismatch for `{key}`: checkpoint wants {wanted}, storage has {found}")]
    ThreadMismatch { key: String, thread_id: String, wanted: u64, found: u64 },

    #[error("storage adapter failure for `{key}`: {reason}")]
    Storage { key: String, reason: String },

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl InstanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InstanceError::NotFound { .. } => ErrorKind::Queue,
            InstanceError::MissingThread { .. } | InstanceError::ThreadMismatch { .. } => ErrorKind::Config,
            InstanceError::Storage { .. } => ErrorKind::Transport,
            InstanceError::Server(err) => err.kind(),
        }
    }
}

pub type InstanceResult<T> = Result<T, InstanceError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
