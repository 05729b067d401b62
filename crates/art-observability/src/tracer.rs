// SPDX-License-Identifier: MIT

//! Span and event emission, plus the `with_span_scope` exactly-once
//! contract between a span's start and its finish.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Correlation ids for one span. Cheap to clone and to pass across an
/// `await` point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerContext {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
}

impl TracerContext {
    pub fn root(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self { trace_id: trace_id.into(), span_id: span_id.into(), parent_span_id: None }
    }

    pub fn child(&self, span_id: impl Into<String>) -> Self {
        Self { trace_id: self.trace_id.clone(), span_id: span_id.into(), parent_span_id: Some(self.span_id.clone()) }
    }
}

/// A telemetry sink. The default production implementation
/// ([`TracingTracer`]) forwards to the `tracing` crate; tests
/// typically use [`CollectorTracer`] to assert on emitted events
/// without a subscriber.
pub trait Tracer: Send + Sync {
    fn start_span(&self, name: &str, ctx: &TracerContext);
    fn finish_span(&self, name: &str, ctx: &TracerContext);
    fn finish_span_error(&self, name: &str, ctx: &TracerContext, message: &str);
    fn emit_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]);
    fn emit_debug_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]);
}

/// Forwards every call straight to `tracing` events (no persistent
/// `tracing::Span` object is kept — fields are logged flat, which is
/// enough for the correlation-id propagation this crate cares about).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, name: &str, ctx: &TracerContext) {
        tracing::info!(span = name, trace_id = %ctx.trace_id, span_id = %ctx.span_id, "span.start");
    }

    fn finish_span(&self, name: &str, ctx: &TracerContext) {
        tracing::info!(span = name, trace_id = %ctx.trace_id, span_id = %ctx.span_id, "span.stop");
    }

    fn finish_span_error(&self, name: &str, ctx: &TracerContext, message: &str) {
        tracing::warn!(span = name, trace_id = %ctx.trace_id, span_id = %ctx.span_id, error = message, "span.exception");
    }

    fn emit_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]) {
        tracing::info!(event = name, trace_id = %ctx.trace_id, span_id = %ctx.span_id, fields = ?fields, "event");
    }

    fn emit_debug_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]) {
        tracing::debug!(event = name, trace_id = %ctx.trace_id, span_id = %ctx.span_id, fields = ?fields, "debug_event");
    }
}

/// One captured tracer call, for assertions in [`CollectorTracer`] tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TracerEvent {
    pub kind: &'static str,
    pub name: String,
    pub span_id: String,
    pub fields: Vec<(String, String)>,
}

/// An in-memory `Tracer` that records every call instead of emitting
/// real telemetry, for deterministic test assertions.
#[derive(Debug, Clone, Default)]
pub struct CollectorTracer {
    events: Arc<parking_lot::Mutex<Vec<TracerEvent>>>,
}

impl CollectorTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TracerEvent> {
        self.events.lock().clone()
    }

    fn record(&self, kind: &'static str, name: &str, ctx: &TracerContext, fields: &[(&str, String)]) {
        self.events.lock().push(TracerEvent {
            kind,
            name: name.to_string(),
            span_id: ctx.span_id.clone(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        });
    }
}

impl Tracer for CollectorTracer {
    fn start_span(&self, name: &str, ctx: &TracerContext) {
        self.record("start", name, ctx, &[]);
    }

    fn finish_span(&self, name: &str, ctx: &TracerContext) {
        self.record("stop", name, ctx, &[]);
    }

    fn finish_span_error(&self, name: &str, ctx: &TracerContext, message: &str) {
        self.record("exception", name, ctx, &[("error", message.to_string())]);
    }

    fn emit_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]) {
        self.record("event", name, ctx, fields);
    }

    fn emit_debug_event(&self, name: &str, ctx: &TracerContext, fields: &[(&str, String)]) {
        self.record("debug_event", name, ctx, fields);
    }
}

static CONTRACT_VIOLATIONS: AtomicU64 = AtomicU64::new(0);

/// Number of `with_span_scope` guards that were dropped without being
/// finished, across the whole process. Exposed for tests; a healthy
/// run never increments this.
pub fn contract_violation_count() -> u64 {
    CONTRACT_VIOLATIONS.load(Ordering::SeqCst)
}

/// An open span handle returned by [`start_span_scope`]. Must be
/// consumed by [`SpanScopeGuard::finish`] or
/// [`SpanScopeGuard::finish_error`] exactly once; dropping it without
/// finishing is a contract violation, logged and counted.
pub struct SpanScopeGuard<'a> {
    tracer: &'a dyn Tracer,
    name: String,
    ctx: TracerContext,
    finished: AtomicBool,
}

impl<'a> SpanScopeGuard<'a> {
    pub fn finish(self) {
        self.tracer.finish_span(&self.name, &self.ctx);
        self.finished.store(true, Ordering::SeqCst);
    }

    pub fn finish_error(self, message: &str) {
        self.tracer.finish_span_error(&self.name, &self.ctx, message);
        self.finished.store(true, Ordering::SeqCst);
    }

    pub fn context(&self) -> &TracerContext {
        &self.ctx
    }
}

impl Drop for SpanScopeGuard<'_> {
    fn drop(&mut self) {
        if !self.finished.load(Ordering::SeqCst) {
            CONTRACT_VIOLATIONS.fetch_add(1, Ordering::SeqCst);
            tracing::error!(span = %self.name, span_id = %self.ctx.span_id, "with_span_scope dropped without finishing");
        }
    }
}

pub fn start_span_scope<'a>(tracer: &'a dyn Tracer, name: &str, ctx: TracerContext) -> SpanScopeGuard<'a> {
    tracer.start_span(name, &ctx);
    SpanScopeGuard { tracer, name: name.to_string(), ctx, finished: AtomicBool::new(false) }
}

/// Run `f` wrapped in a span that always finishes exactly once:
/// `Ok` finishes normally, `Err` finishes as an error and the error is
/// returned unchanged to the caller (property: the wrapped future's
/// result passes through `with_span` untouched).
pub async fn with_span<T, E, F, Fut>(tracer: &dyn Tracer, name: &str, ctx: TracerContext, f: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let guard = start_span_scope(tracer, name, ctx);
    let result = f().await;
    match &result {
        Ok(_) => guard.finish(),
        Err(err) => guard.finish_error(&err.to_string()),
    }
    result
}

#[cfg(test)]
#[path = "tracer_tests.rs"]
mod tests;
