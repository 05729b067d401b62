// SPDX-License-Identifier: MIT

//! Demonstration binary: a `calc` agent class (an integer accumulator
//! with `add`/`sub`/`mul`/`reset` actions) served through
//! [`art_server::AgentServer`] and kept alive across invocations by
//! [`art_instance::InstanceManager`]. Configuration loads from an
//! optional `toml` file, falling back to built-in defaults.

mod calc_agent;
mod config;

use anyhow::Context;
use art_core::instruction::Instruction;
use art_core::signal::Signal;
use art_instance::{FilesystemStorageAdapter, InstanceConfig, InstanceManager};
use art_observability::{DebugConfig, DebugLevel, ObservabilityConfig};
use art_server::AgentServer;
use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "art", about = "Demonstration CLI for the agent runtime core")]
struct Cli {
    /// Path to a toml config file; built-in defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one calc operation against an instance, starting or thawing it first.
    Call {
        /// Instance key (one logical calculator session).
        key: String,
        #[arg(value_enum)]
        op: Op,
        by: i64,
    },
    /// Print an instance's current state without starting it if absent.
    State { key: String },
    /// Hibernate an instance, persisting it if storage is configured.
    Stop { key: String },
    /// Print how many instances are currently running.
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Op {
    Add,
    Sub,
    Mul,
    Reset,
}

impl Op {
    fn action_name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Reset => "reset",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let observability = Arc::new(build_observability(&config));
    init_tracing(&resolve_log_filter(&config, &observability));

    let manager = build_manager(&config, observability)?;

    match cli.command {
        Command::Call { key, op, by } => run_call(&manager, &key, op, by).await,
        Command::State { key } => run_state(&manager, &key).await,
        Command::Stop { key } => run_stop(&manager, &key).await,
        Command::Stats => run_stats(&manager),
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Seeds the process-wide debug substrate from the `[debug]` toggle in
/// config, the same global/per-instance/runtime-override resolution
/// that [`art_server::AgentServer::set_debug`] consults at runtime.
fn build_observability(config: &CliConfig) -> ObservabilityConfig {
    let observability = ObservabilityConfig::new();
    let level = if config.debug { DebugLevel::Verbose } else { DebugLevel::Off };
    observability.set_global(DebugConfig::from_level(level));
    observability
}

/// A config-supplied `log_level` always wins; with none set, the
/// tracing filter falls back to whatever the debug substrate resolved
/// for this agent class.
fn resolve_log_filter(config: &CliConfig, observability: &ObservabilityConfig) -> String {
    if let Some(level) = config.log_level_for("default") {
        return level;
    }
    match observability.resolve(Some("default"), None).log_level {
        DebugLevel::Off => "info".to_string(),
        DebugLevel::On => "debug".to_string(),
        DebugLevel::Verbose => "trace".to_string(),
    }
}

fn build_manager(config: &CliConfig, observability: Arc<ObservabilityConfig>) -> anyhow::Result<InstanceManager> {
    let mut instance_config =
        InstanceConfig::new(config.agent.clone(), calc_agent::schema()).observability(observability);
    for action in calc_agent::actions() {
        instance_config = instance_config.action(action);
    }
    instance_config.max_queue_size = config.max_queue_size_for("default");

    if let Some(timeout) = config.idle_timeout_for("default") {
        instance_config = instance_config.idle_timeout(timeout);
    }

    if let Some(dir) = &config.storage_dir {
        let storage = FilesystemStorageAdapter::new(dir)
            .with_context(|| format!("opening storage directory {}", dir.display()))?;
        instance_config = instance_config.storage(Arc::new(storage));
    }

    Ok(InstanceManager::new(instance_config))
}

async fn run_call(manager: &InstanceManager, key: &str, op: Op, by: i64) -> anyhow::Result<()> {
    tracing::info!(key, action = op.action_name(), by, "dispatching calc action");
    let server: AgentServer = manager.get(key, None).await?;
    let instruction =
        Instruction::new(op.action_name()).with_params(serde_json::Map::from_iter([("by".into(), json!(by))]));
    let signal = Signal::new("art.agent.cmd.run", serde_json::to_value(&instruction)?).with_source("art-cli");
    let reply = server.call(signal, Duration::from_secs(5)).await?;
    println!("{key}: {}", reply.data);
    Ok(())
}

async fn run_state(manager: &InstanceManager, key: &str) -> anyhow::Result<()> {
    let found: Option<AgentServer> = manager.lookup(key);
    match found {
        Some(server) => {
            let state = server.state().await?;
            println!("{key}: {}", serde_json::to_string_pretty(&state.agent.state)?);
            Ok(())
        }
        None => {
            println!("{key}: not running");
            Ok(())
        }
    }
}

async fn run_stop(manager: &InstanceManager, key: &str) -> anyhow::Result<()> {
    manager.stop(key).await?;
    println!("{key}: stopped");
    Ok(())
}

fn run_stats(manager: &InstanceManager) -> anyhow::Result<()> {
    let stats = manager.stats();
    println!("running instances: {}", stats.count);
    Ok(())
}
