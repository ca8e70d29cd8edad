// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `simrun start`

use anyhow::{anyhow, Result};
use clap::Args;
use simrun_adapters::ProcessAdapter;
use simrun_core::{Clock, PlatformMode, RunState, RunnerStatus};
use simrun_engine::Orchestrator;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::color;
use crate::output::{print_json, progress_line, OutputFormat};

#[derive(Args)]
pub struct StartArgs {
    /// Simulation id (names its directory under the state dir)
    pub id: String,

    /// twitter, reddit, or parallel
    #[arg(long, default_value = "parallel")]
    pub platform: PlatformMode,

    /// Simulation configuration file (JSON)
    #[arg(long)]
    pub config: PathBuf,

    /// Stay attached and print progress until the run ends (Ctrl-C stops it)
    #[arg(long)]
    pub follow: bool,
}

pub async fn handle<P, C>(
    args: StartArgs,
    orchestrator: &Orchestrator<P, C>,
    format: OutputFormat,
) -> Result<()>
where
    P: ProcessAdapter,
    C: Clock,
{
    let state = orchestrator
        .start(&args.id, args.platform, &args.config)
        .await?;

    if !args.follow {
        match format {
            OutputFormat::Json => print_json(&state)?,
            OutputFormat::Text => println!(
                "Started simulation {} ({}, pid {})",
                state.simulation_id,
                state.platform,
                state.process_pid.map_or_else(|| "-".to_string(), |p| p.to_string()),
            ),
        }
        return Ok(());
    }

    if format == OutputFormat::Text {
        println!(
            "{}",
            color::header(&format!(
                "Following simulation {} ({} rounds); Ctrl-C stops it",
                state.simulation_id, state.total_rounds
            ))
        );
    }
    let poll = orchestrator.config().poll_interval;
    let last = follow(orchestrator, &args.id, poll, tokio::signal::ctrl_c(), |s| {
        if format == OutputFormat::Text {
            println!("{}", color::context(&progress_line(s)));
        }
    })
    .await?;

    match format {
        OutputFormat::Json => print_json(&last)?,
        OutputFormat::Text => println!("{}", outcome_line(&last)),
    }
    if last.runner_status == RunnerStatus::Failed {
        anyhow::bail!("simulation {} failed", last.simulation_id);
    }
    Ok(())
}

/// Poll `id` until it reaches a terminal state, reporting each change in
/// progress. Stops the run when `interrupt` resolves first.
pub async fn follow<P, C, I>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    poll: Duration,
    interrupt: I,
    mut report: impl FnMut(&RunState),
) -> Result<RunState>
where
    P: ProcessAdapter,
    C: Clock,
    I: Future,
{
    tokio::pin!(interrupt);
    let mut last_seen = None;
    loop {
        let state = orchestrator
            .status(id)
            .await?
            .ok_or_else(|| anyhow!("simulation {id} disappeared"))?;

        let progress = (state.current_round, state.total_actions());
        if last_seen != Some(progress) {
            report(&state);
            last_seen = Some(progress);
        }
        if state.runner_status.is_terminal() {
            return Ok(state);
        }

        tokio::select! {
            _ = tokio::time::sleep(poll) => {}
            _ = &mut interrupt => {
                tracing::info!(simulation_id = id, "follow interrupted; stopping run");
                eprintln!("Stopping simulation {id}...");
                return Ok(orchestrator.stop(id).await?);
            }
        }
    }
}

/// Final line printed when a followed run ends.
pub fn outcome_line(state: &RunState) -> String {
    match (&state.runner_status, &state.last_error) {
        (RunnerStatus::Failed, Some(error)) => {
            let last_line = error.lines().last().unwrap_or_default();
            format!("Simulation {} failed: {}", state.simulation_id, last_line)
        }
        (status, _) => format!(
            "Simulation {} {} after {} actions",
            state.simulation_id,
            status,
            state.total_actions()
        ),
    }
}

#[cfg(test)]
#[path = "start_tests.rs"]
mod tests;
