// SPDX-License-Identifier: MIT

//! The agent server: a single-owner actor task hosting one
//! [`AgentValue`], exposed through a cheap, cloneable handle.

use crate::debug_ring::DebugEvent;
use crate::error::ServerError;
use crate::hibernate::Hibernator;
use crate::interpreter::apply_directives;
use crate::state::ServerState;
use crate::status::{Mode, Status};
use art_core::action::Action;
use art_core::agent_value::{AgentId, AgentValue};
use art_core::clock::{Clock, SystemClock};
use art_core::error::CoreError;
use art_core::instruction::Instruction;
use art_core::lifecycle::{AgentLifecycle, NoopLifecycle};
use art_core::pipeline::{cmd, CmdOpts};
use art_core::schema::Schema;
use art_core::signal::Signal;
use art_observability::{DebugConfig, DebugLevel, ObservabilityConfig};
use art_signal::{Dispatcher, LoggerDispatcher, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

const DEFAULT_QUEUE_SIZE: usize = 128;
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);
const COMMAND_CHANNEL_SIZE: usize = 256;

pub struct StartOpts {
    pub id: Option<String>,
    pub schema: Schema,
    pub initial_state: Option<serde_json::Map<String, Value>>,
    pub actions: Vec<Arc<dyn Action>>,
    pub mode: Mode,
    pub max_queue_size: usize,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub instance_name: Option<String>,
    pub reply_timeout: Duration,
    pub observability: Arc<ObservabilityConfig>,
    pub clock: Arc<dyn Clock>,
    pub lifecycle: Arc<dyn AgentLifecycle>,
    /// Persists this agent's final state through `Directive::Stop`,
    /// without an RPC round-trip back through its own handle. `None`
    /// means a stopped agent is simply dropped.
    pub hibernator: Option<Arc<dyn Hibernator>>,
    /// Seeds `ServerState::thread_log` before the actor's receive loop
    /// starts. Left empty on a normal thaw — the persisted thread
    /// itself is never replayed back into a resumed agent, only
    /// confirmed present — but available to a caller that does want a
    /// resumed agent's log to start non-empty.
    pub thread_log: Vec<Value>,
}

impl StartOpts {
    pub fn new(schema: Schema) -> Self {
        Self {
            id: None,
            schema,
            initial_state: None,
            actions: Vec::new(),
            mode: Mode::Auto,
            max_queue_size: DEFAULT_QUEUE_SIZE,
            dispatcher: Arc::new(LoggerDispatcher::new("agent_server")),
            instance_name: None,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            observability: Arc::new(ObservabilityConfig::new()),
            clock: Arc::new(SystemClock),
            lifecycle: Arc::new(NoopLifecycle),
            hibernator: None,
            thread_log: Vec::new(),
        }
    }

    pub fn action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn initial_state(mut self, state: serde_json::Map<String, Value>) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    /// Shares a process-wide debug substrate with other servers and
    /// the instance manager, instead of the default private one.
    pub fn observability(mut self, observability: Arc<ObservabilityConfig>) -> Self {
        self.observability = observability;
        self
    }

    pub fn lifecycle(mut self, lifecycle: Arc<dyn AgentLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn hibernator(mut self, hibernator: Arc<dyn Hibernator>) -> Self {
        self.hibernator = Some(hibernator);
        self
    }
}

struct PendingReply {
    sender: oneshot::Sender<Result<Signal, ServerError>>,
    cancel: CancellationToken,
}

enum Command {
    Call { signal: Signal, reply: oneshot::Sender<Result<Signal, ServerError>> },
    Cast { signal: Signal },
    State { reply: oneshot::Sender<ServerState> },
    Attach { reply: oneshot::Sender<()> },
    Detach,
    SetDebug { on: bool, reply: oneshot::Sender<()> },
    RecentEvents { limit: Option<usize>, reply: oneshot::Sender<Vec<DebugEvent>> },
    ReplyTimeoutFired { signal_id: String },
}

/// A cheap, cloneable handle to a running agent server. The server
/// task itself exits once every clone of the handle (and every
/// in-flight scheduled timer holding a clone of the command sender)
/// has been dropped.
#[derive(Debug, Clone)]
pub struct AgentServer {
    commands: mpsc::Sender<Command>,
}

impl AgentServer {
    pub fn start(opts: StartOpts) -> Result<Self, ServerError> {
        let StartOpts {
            id,
            schema,
            initial_state,
            actions,
            mode,
            max_queue_size,
            dispatcher,
            instance_name,
            reply_timeout,
            observability,
            clock,
            lifecycle,
            hibernator,
            thread_log,
        } = opts;

        let id = match id {
            Some(id) => Some(AgentId::checked_from_string(&id).ok_or_else(|| ServerError::InvalidId { id })?),
            None => None,
        };
        let mut agent = AgentValue::new(id, schema, initial_state);
        for action in actions {
            agent = agent.register_action(action)?;
        }

        let debug_config = observability.resolve(instance_name.as_deref(), None);
        let mut state = ServerState::new(agent, max_queue_size, debug_config, observability);
        state.mode = mode;
        state.instance_name = instance_name;
        state.thread_log = thread_log;
        state.transition(Status::Idle)?;

        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        tokio::spawn(run_actor(state, rx, dispatcher, clock, reply_timeout, tx.clone(), lifecycle, hibernator));

        Ok(Self { commands: tx })
    }

    /// Synchronous call: blocks until `signal` has been fully run
    /// through the pipeline and its directives applied, or `timeout`
    /// elapses.
    pub async fn call(&self, signal: Signal, timeout: Duration) -> Result<Signal, ServerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands.send(Command::Call { signal, reply: reply_tx }).await.map_err(|_| ServerError::Stopped)?;
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ServerError::Stopped),
            Err(_) => Err(ServerError::ReplyTimeout { signal_id: String::new() }),
        }
    }

    /// Asynchronous cast: returns the signal's id immediately.
    pub async fn cast(&self, signal: Signal) -> Result<String, ServerError> {
        let signal_id = signal.id.to_string();
        self.commands.send(Command::Cast { signal }).await.map_err(|_| ServerError::Stopped)?;
        Ok(signal_id)
    }

    pub async fn state(&self) -> Result<ServerState, ServerError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::State { reply: tx }).await.map_err(|_| ServerError::Stopped)?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    pub async fn attach(&self) -> Result<(), ServerError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Attach { reply: tx }).await.map_err(|_| ServerError::Stopped)?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    pub async fn detach(&self) -> Result<(), ServerError> {
        self.commands.send(Command::Detach).await.map_err(|_| ServerError::Stopped)
    }

    pub async fn set_debug(&self, on: bool) -> Result<(), ServerError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::SetDebug { on, reply: tx }).await.map_err(|_| ServerError::Stopped)?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    pub async fn recent_events(&self, limit: Option<usize>) -> Result<Vec<DebugEvent>, ServerError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::RecentEvents { limit, reply: tx }).await.map_err(|_| ServerError::Stopped)?;
        rx.await.map_err(|_| ServerError::Stopped)
    }
}

/// Query signal types resolved by the router ahead of instruction
/// execution, so a caller can inspect an agent without spending a
/// pipeline turn on it.
#[derive(Clone, Copy)]
enum Query {
    State,
    QueueSize,
}

fn query_router() -> &'static Router<Query> {
    static ROUTER: OnceLock<Router<Query>> = OnceLock::new();
    ROUTER.get_or_init(|| {
        let mut router = Router::new();
        router.insert("art.agent.cmd.state", Query::State);
        router.insert("art.agent.cmd.queue_size", Query::QueueSize);
        router
    })
}

fn resolve_query(state: &ServerState, query: Query) -> Signal {
    let data = match query {
        Query::State => serde_json::to_value(&state.agent.state).unwrap_or(Value::Null),
        Query::QueueSize => json!({"queue_size": state.pending_signals.len(), "max_size": state.max_queue_size}),
    };
    Signal::new("art.agent.evt.replied", data).with_source("art-server")
}

fn instruction_from_signal(signal: &Signal) -> Result<Instruction, ServerError> {
    serde_json::from_value::<Instruction>(signal.data.clone())
        .map_err(|err| ServerError::Core(CoreError::InvalidInstruction { agent_id: String::new(), reason: err.to_string() }))
}

fn schedule_reply_timeout(self_sender: mpsc::Sender<Command>, signal_id: String, timeout: Duration) -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                let _ = self_sender.send(Command::ReplyTimeoutFired { signal_id }).await;
            }
            _ = token.cancelled() => {}
        }
    });
    cancel
}

fn schedule_signal(self_sender: mpsc::Sender<Command>, delay_ms: u64, signal: Signal) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        let _ = self_sender.send(Command::Cast { signal }).await;
    });
}

async fn finalize_signal(
    reply_refs: &mut HashMap<String, PendingReply>,
    signal_id: &str,
    result: Result<Signal, ServerError>,
) {
    if let Some(pending) = reply_refs.remove(signal_id) {
        pending.cancel.cancel();
        let _ = pending.sender.send(result);
    }
}

async fn process_one_signal(
    state: &mut ServerState,
    reply_refs: &mut HashMap<String, PendingReply>,
    dispatcher: &Arc<dyn Dispatcher>,
    clock: &dyn Clock,
    hooks: &dyn AgentLifecycle,
    self_sender: &mpsc::Sender<Command>,
    signal: Signal,
) -> Option<String> {
    let signal_id = signal.id.to_string();

    if let Some(query) = query_router().best_match(&signal.signal_type).copied() {
        let response = resolve_query(state, query);
        finalize_signal(reply_refs, &signal_id, Ok(response)).await;
        return None;
    }

    if state.transition(Status::Planning).is_err() {
        state.pending_signals.push_front(signal);
        return None;
    }

    let instruction = match instruction_from_signal(&signal) {
        Ok(instruction) => instruction,
        Err(err) => {
            finalize_signal(reply_refs, &signal_id, Err(err)).await;
            let _ = state.transition(Status::Idle);
            return None;
        }
    };

    let _ = state.transition(Status::Running);

    state.thread_log.push(serde_json::to_value(&instruction).unwrap_or(Value::Null));

    let agent = state.agent.clone();
    let outcome = cmd(agent, vec![instruction], CmdOpts::default(), hooks).await;

    let stop_reason = match outcome {
        Ok((next_agent, directives)) => {
            state.agent = next_agent;
            match apply_directives(state, directives, &signal, dispatcher, clock).await {
                Ok(interp) => {
                    for (delay_ms, scheduled) in interp.scheduled {
                        schedule_signal(self_sender.clone(), delay_ms, scheduled);
                    }
                    let response_data = serde_json::to_value(&state.agent.state).unwrap_or(Value::Null);
                    let response = Signal::new("art.agent.evt.replied", response_data).with_source("art-server");
                    finalize_signal(reply_refs, &signal_id, Ok(response)).await;
                    interp.stop_requested
                }
                Err(err) => {
                    finalize_signal(reply_refs, &signal_id, Err(err)).await;
                    None
                }
            }
        }
        Err(err) => {
            finalize_signal(reply_refs, &signal_id, Err(ServerError::Core(err))).await;
            None
        }
    };

    let _ = state.transition(Status::Idle);
    stop_reason
}

async fn process_queue(
    state: &mut ServerState,
    reply_refs: &mut HashMap<String, PendingReply>,
    dispatcher: &Arc<dyn Dispatcher>,
    clock: &dyn Clock,
    hooks: &dyn AgentLifecycle,
    self_sender: &mpsc::Sender<Command>,
) -> Option<String> {
    while let Some(signal) = state.pending_signals.pop_front() {
        if let Some(reason) = process_one_signal(state, reply_refs, dispatcher, clock, hooks, self_sender, signal).await
        {
            return Some(reason);
        }
    }
    None
}

/// Runs once, the moment `Directive::Stop` is first observed: invokes
/// the configured lifecycle's shutdown hook, records a `stopped`
/// debug event, drops the child registry, and hibernates through
/// `hibernator` if one is configured. `run_actor` breaks its receive
/// loop immediately after, so this never runs twice.
async fn shutdown(
    state: &mut ServerState,
    clock: &dyn Clock,
    hooks: &dyn AgentLifecycle,
    hibernator: &Option<Arc<dyn Hibernator>>,
    reason: &str,
) {
    let agent_id = state.agent.id.as_str().to_string();
    hooks.on_shutdown(&agent_id, reason);
    state.record_debug(clock.epoch_ms(), "stopped", json!({"reason": reason}));
    state.children.clear();
    tracing::info!(agent_id = %agent_id, reason = %reason, "agent server stopped");

    if let Some(hibernator) = hibernator {
        match hibernator.hibernate(&agent_id, &state.agent.state, &state.thread_log).await {
            Ok(()) => tracing::info!(agent_id = %agent_id, "agent hibernated at shutdown"),
            Err(err) => tracing::warn!(agent_id = %agent_id, error = %err, "hibernation at shutdown failed"),
        }
    }
}

async fn run_actor(
    mut state: ServerState,
    mut rx: mpsc::Receiver<Command>,
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<dyn Clock>,
    reply_timeout: Duration,
    self_sender: mpsc::Sender<Command>,
    hooks: Arc<dyn AgentLifecycle>,
    hibernator: Option<Arc<dyn Hibernator>>,
) {
    let mut reply_refs: HashMap<String, PendingReply> = HashMap::new();

    while let Some(command) = rx.recv().await {
        let stopped_reason = match command {
            Command::Call { signal, reply } => {
                let signal_id = signal.id.to_string();
                match state.enqueue(signal) {
                    Ok(()) => {
                        let cancel = schedule_reply_timeout(self_sender.clone(), signal_id.clone(), reply_timeout);
                        reply_refs.insert(signal_id, PendingReply { sender: reply, cancel });
                        process_queue(&mut state, &mut reply_refs, &dispatcher, clock.as_ref(), hooks.as_ref(), &self_sender)
                            .await
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                        None
                    }
                }
            }
            Command::Cast { signal } => {
                if state.enqueue(signal).is_ok() {
                    process_queue(&mut state, &mut reply_refs, &dispatcher, clock.as_ref(), hooks.as_ref(), &self_sender)
                        .await
                } else {
                    None
                }
            }
            Command::State { reply } => {
                let _ = reply.send(state.clone());
                None
            }
            Command::Attach { reply } => {
                state.attachment_count += 1;
                let _ = reply.send(());
                None
            }
            Command::Detach => {
                state.attachment_count = state.attachment_count.saturating_sub(1);
                None
            }
            Command::SetDebug { on, reply } => {
                // A local override, never written back to `observability` —
                // siblings sharing the same substrate never see it.
                state.debug_override = if on { Some(DebugConfig::from_level(DebugLevel::On)) } else { None };
                state.debug_config =
                    state.observability.resolve(state.instance_name.as_deref(), state.debug_override.clone());
                state.record_debug(clock.epoch_ms(), "debug.toggled", Value::Bool(on));
                let _ = reply.send(());
                None
            }
            Command::RecentEvents { limit, reply } => {
                let _ = reply.send(state.debug_events.recent(limit));
                None
            }
            Command::ReplyTimeoutFired { signal_id } => {
                finalize_signal(&mut reply_refs, &signal_id, Err(ServerError::ReplyTimeout { signal_id: signal_id.clone() }))
                    .await;
                None
            }
        };

        if let Some(reason) = stopped_reason {
            shutdown(&mut state, clock.as_ref(), hooks.as_ref(), &hibernator, &reason).await;
            break;
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
