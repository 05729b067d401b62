// SPDX-License-Identifier: MIT

use art_core::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Errors raised by routing and dispatch.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum SignalError {
    #[error("no route matches signal type `{signal_type}`")]
    NoRoute { signal_type: String },

    #[error("dispatch to sink `{sink}` failed: {reason}")]
    DispatchFailed { sink: String, reason: String },
}

impl SignalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignalError::NoRoute { .. } => ErrorKind::Directive,
            SignalError::DispatchFailed { .. } => ErrorKind::Transport,
        }
    }
}

pub type SignalResult<T> = Result<T, SignalError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
