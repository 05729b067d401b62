// SPDX-License-Identifier: MIT

//! Helpers for carrying correlation ids from a [`Signal`] into a
//! [`TracerContext`] and back onto signals derived from it.

use crate::tracer::TracerContext;
use art_core::signal::Signal;

pub fn context_for_signal(signal: &Signal) -> TracerContext {
    TracerContext {
        trace_id: signal.trace_id.clone(),
        span_id: signal.span_id.clone(),
        parent_span_id: signal.parent_span_id.clone(),
    }
}

/// Stamp `signal`'s correlation fields from `ctx`, leaving its
/// `causation_id` untouched (that is set by [`Signal::derive`]).
pub fn stamp_signal(signal: &mut Signal, ctx: &TracerContext) {
    signal.trace_id = ctx.trace_id.clone();
    signal.span_id = ctx.span_id.clone();
    signal.parent_span_id = ctx.parent_span_id.clone();
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;
