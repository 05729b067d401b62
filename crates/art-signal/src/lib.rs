// SPDX-License-Identifier: MIT

//! Signal routing and dispatch: a dotted-pattern trie router plus
//! pluggable output sinks.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod dispatch;
pub mod error;
pub mod router;

pub use dispatch::{ChannelDispatcher, Dispatcher, LoggerDispatcher};
pub use error::{SignalError, SignalResult};
pub use router::Router;
