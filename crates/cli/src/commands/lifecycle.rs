// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `simrun stop` and `simrun purge`

use anyhow::Result;
use simrun_adapters::ProcessAdapter;
use simrun_core::{Clock, RunState, RunnerStatus};
use simrun_engine::Orchestrator;

use crate::output::{print_json, OutputFormat};

pub async fn stop<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let state = orchestrator.stop(id).await?;
    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Text => println!("{}", stop_message(&state)),
    }
    Ok(())
}

pub async fn purge<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let state = orchestrator.purge(id).await?;
    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Text => println!("Removed simulation {}", state.simulation_id),
    }
    Ok(())
}

pub fn stop_message(state: &RunState) -> String {
    match state.runner_status {
        RunnerStatus::Stopped => format!("Stopped simulation {}", state.simulation_id),
        status => format!(
            "Simulation {} already {}, nothing to stop",
            state.simulation_id, status
        ),
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
