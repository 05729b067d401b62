// SPDX-License-Identifier: MIT

//! Shared error taxonomy and the pure-core error type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The error taxonomy shared by every crate in this workspace.
///
/// Each crate defines its own `thiserror`-derived error enum with
/// variants specific to its concerns, but every variant maps onto one
/// of these kinds via a `kind()` method, so callers can match on kind
/// without depending on crate-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Execution,
    Directive,
    Queue,
    Config,
    Transport,
    TracerContract,
}

crate::simple_display! {
    ErrorKind {
        Validation => "validation",
        Execution => "execution",
        Directive => "directive",
        Queue => "queue",
        Config => "config",
        Transport => "transport",
        TracerContract => "tracer_contract",
    }
}

/// Errors produced by the pure agent-value and command-pipeline layer.
///
/// All variants carry structured metadata (never a bare message) so a
/// caller can recover `agent_id`, the offending field, or the rejected
/// value without string-parsing the error.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum CoreError {
    #[error("agent {agent_id}: field `{field}` expected type {expected}, got {actual}")]
    TypeMismatch { agent_id: String, field: String, expected: String, actual: String },

    #[error("agent {agent_id}: required field `{field}` is missing")]
    MissingRequired { agent_id: String, field: String },

    #[error("agent {agent_id}: field `{field}` value {value} is not one of the allowed values")]
    NotAllowed { agent_id: String, field: String, value: Value },

    #[error("agent {agent_id}: unknown field `{field}` in strict mode")]
    UnknownField { agent_id: String, field: String },

    #[error("agent {agent_id}: action `{action}` is not registered")]
    UnregisteredAction { agent_id: String, action: String },

    #[error("agent {agent_id}: action `{action}` is already registered")]
    DuplicateAction { agent_id: String, action: String },

    #[error("agent {agent_id}: action `{action}` failed: {reason}")]
    ActionFailed { agent_id: String, action: String, reason: String },

    #[error("agent {agent_id}: invalid instruction: {reason}")]
    InvalidInstruction { agent_id: String, reason: String },

    #[error("agent {agent_id}: malformed agent definition: {reason}")]
    Config { agent_id: String, reason: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TypeMismatch { .. }
            | CoreError::MissingRequired { .. }
            | CoreError::NotAllowed { .. }
            | CoreError::UnknownField { .. } => ErrorKind::Validation,
            CoreError::UnregisteredAction { .. }
            | CoreError::DuplicateAction { .. }
            | CoreError::ActionFailed { .. }
            | CoreError::InvalidInstruction { .. } => ErrorKind::Execution,
            CoreError::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn agent_id(&self) -> &str {
        match self {
            CoreError::TypeMismatch { agent_id, .. }
            | CoreError::MissingRequired { agent_id, .. }
            | CoreError::NotAllowed { agent_id, .. }
            | CoreError::UnknownField { agent_id, .. }
            | CoreError::UnregisteredAction { agent_id, .. }
            | CoreError::DuplicateAction { agent_id, .. }
            | CoreError::ActionFailed { agent_id, .. }
            | CoreError::InvalidInstruction { agent_id, .. }
            | CoreError::Config { agent_id, .. } => agent_id,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
