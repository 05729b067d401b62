// SPDX-License-Identifier: MIT

//! Pure data model and command pipeline for the agent runtime: agent
//! values, their schema-validated state, actions, instructions,
//! signals, and directives. Nothing in this crate touches I/O or
//! concurrency primitives — those live in `art-signal`, `art-server`,
//! and `art-instance`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod action;
pub mod agent_value;
pub mod clock;
pub mod directive;
pub mod error;
pub mod id;
pub mod instruction;
pub mod lifecycle;
pub mod macros;
pub mod pipeline;
pub mod schema;
pub mod signal;

pub use action::{Action, ActionOutcome};
pub use agent_value::{AgentId, AgentValue};
pub use clock::{Clock, FakeClock, SystemClock};
pub use directive::{ChildSpec, Directive, SpawnAgentOpts, StateOp};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use instruction::Instruction;
pub use lifecycle::{AgentLifecycle, NoopLifecycle};
pub use pipeline::{cmd, CmdOpts, Runner, SimpleRunner};
pub use schema::{deep_merge, FieldSpec, FieldType, Schema};
pub use signal::{DispatchConfig, Signal, SignalId};

#[cfg(test)]
mod properties;
