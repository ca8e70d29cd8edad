// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! simrun - simulation run orchestrator CLI

mod color;
mod commands;
mod env;
mod logging;
mod output;
mod table;

#[cfg(test)]
mod test_support;

use output::OutputFormat;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{history, lifecycle, start, status};
use simrun_adapters::{OsProcessAdapter, TracedProcess};
use simrun_core::{SystemClock, UuidIdGen};
use simrun_engine::{Orchestrator, OrchestratorDeps, RunnerConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "simrun",
    version,
    about = "Launch, watch, and stop social-media simulation workers"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a simulation worker
    Start(start::StartArgs),
    /// Stop a running simulation (SIGTERM, then SIGKILL after the grace period)
    Stop {
        /// Simulation id
        id: String,
    },
    /// Show one simulation's run state
    Status {
        /// Simulation id
        id: String,
    },
    /// List simulations, most recently started first
    List(status::ListArgs),
    /// Show agent actions from the current run, newest first
    Actions(history::ActionsArgs),
    /// Show per-round activity of the current run
    Timeline {
        /// Simulation id
        id: String,
    },
    /// Show per-agent totals of the current run
    Stats {
        /// Simulation id
        id: String,
    },
    /// Delete a finished simulation's run record and logs
    Purge {
        /// Simulation id
        id: String,
    },
}

fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        // No subcommand provided: print help and exit 0
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    let config = RunnerConfig::load()?;
    let _log_guard = logging::setup_logging(&config.state_dir)?;
    tracing::debug!(
        state_dir = %config.state_dir.display(),
        worker = %config.worker.program,
        "runner config loaded"
    );

    let orchestrator = Orchestrator::open(
        config,
        OrchestratorDeps {
            processes: TracedProcess::new(OsProcessAdapter::new()),
            clock: SystemClock,
            ids: Arc::new(UuidIdGen),
        },
    )
    .await?;

    let result = match command {
        Commands::Start(args) => start::handle(args, &orchestrator, format).await,
        Commands::Stop { id } => lifecycle::stop(&orchestrator, &id, format).await,
        Commands::Status { id } => status::status(&orchestrator, &id, format).await,
        Commands::List(args) => status::list(&orchestrator, args, format).await,
        Commands::Actions(args) => history::actions(&orchestrator, args, format).await,
        Commands::Timeline { id } => history::timeline(&orchestrator, &id, format).await,
        Commands::Stats { id } => history::stats(&orchestrator, &id, format).await,
        Commands::Purge { id } => lifecycle::purge(&orchestrator, &id, format).await,
    };

    // Workers outlive the CLI; the next invocation re-attaches to them.
    orchestrator.shutdown(false).await;
    result
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
