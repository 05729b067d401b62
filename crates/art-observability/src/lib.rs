// SPDX-License-Identifier: MIT

//! The observability substrate: resolved debug configuration, span
//! emission with an exactly-once finish contract, and correlation-id
//! propagation helpers shared by the server and instance crates.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod correlation;
pub mod tracer;

pub use config::{DebugConfig, DebugEventsMode, DebugLevel, ObservabilityConfig, TracerFailureMode};
pub use correlation::{context_for_signal, stamp_signal};
pub use tracer::{
    contract_violation_count, start_span_scope, with_span, CollectorTracer, SpanScopeGuard, Tracer, TracerContext,
    TracerEvent, TracingTracer,
};
