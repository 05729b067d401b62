// SPDX-License-Identifier: MIT

//! The agent server: a single-owner actor hosting one `AgentValue`,
//! the directive interpreter that applies its effects to runtime
//! state, and the lifecycle/queue/debug bookkeeping around it.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod debug_ring;
pub mod error;
pub mod hibernate;
pub mod interpreter;
pub mod server;
pub mod state;
pub mod status;

pub use debug_ring::{DebugEvent, DebugRing};
pub use error::{ServerError, ServerResult};
pub use hibernate::Hibernator;
pub use interpreter::{apply_directives, InterpretOutcome};
pub use server::{AgentServer, StartOpts};
pub use state::{ChildRecord, ServerState};
pub use status::{Mode, Status};
