// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `simrun status` and `simrun list`

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use simrun_adapters::ProcessAdapter;
use simrun_core::{format_run_duration, Clock, Platform, RunState};
use simrun_engine::Orchestrator;
use std::fmt::Write as _;

use crate::output::{format_hour, format_progress, format_time_ago, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ListArgs {
    /// Maximum simulations to show (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip this many of the most recently started simulations
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

pub async fn status<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let Some(state) = orchestrator.status(id).await? else {
        match format {
            OutputFormat::Json => print_json(&serde_json::Value::Null)?,
            OutputFormat::Text => println!("Simulation {id} has never been started"),
        }
        return Ok(());
    };
    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Text => print!("{}", render_state(&state, Utc::now())),
    }
    Ok(())
}

pub async fn list<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    args: ListArgs,
    format: OutputFormat,
) -> Result<()> {
    let limit = args
        .limit
        .unwrap_or(orchestrator.config().list_page_size);
    let states = orchestrator.list_page(args.offset, limit).await?;

    match format {
        OutputFormat::Json => print_json(&states)?,
        OutputFormat::Text => {
            if states.is_empty() {
                println!("No simulations");
                return Ok(());
            }
            let mut table = Table::new(list_columns());
            fill_list(&mut table, &states, Utc::now());
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

/// Detail view of one run, one `label: value` line per field.
pub fn render_state(state: &RunState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Simulation: {}", state.simulation_id);
    let _ = writeln!(out, "  Status:   {}", state.runner_status);
    let _ = writeln!(out, "  Run:      {}", state.run_id);
    let _ = writeln!(out, "  Platform: {}", platform_detail(state));
    if let Some(pid) = state.process_pid {
        let _ = writeln!(out, "  Pid:      {pid}");
    }
    let _ = writeln!(
        out,
        "  Round:    {} (hour {})",
        format_progress(state),
        format_hour(Some(state.simulated_hours))
    );
    let _ = writeln!(
        out,
        "  Actions:  {} (twitter {}, reddit {})",
        state.total_actions(),
        state.twitter_actions_count,
        state.reddit_actions_count
    );
    let _ = writeln!(
        out,
        "  Started:  {} ({} ago)",
        state.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_time_ago(state.started_at, now)
    );
    let _ = writeln!(
        out,
        "  Duration: {}",
        format_run_duration(state.started_at, state.ended_at, now)
    );
    let _ = writeln!(out, "  Config:   {}", state.config_path.display());
    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "  Error:");
        for line in error.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}

/// `parallel (twitter running, reddit done)` style platform summary.
fn platform_detail(state: &RunState) -> String {
    let flags: Vec<String> = state
        .platform
        .platforms()
        .iter()
        .map(|p| {
            let (running, completed) = match p {
                Platform::Twitter => (state.twitter_running, state.twitter_completed),
                Platform::Reddit => (state.reddit_running, state.reddit_completed),
            };
            let word = if completed {
                "done"
            } else if running {
                "running"
            } else {
                "idle"
            };
            format!("{p} {word}")
        })
        .collect();
    format!("{} ({})", state.platform, flags.join(", "))
}

pub fn list_columns() -> Vec<Column> {
    vec![
        Column::left("SIMULATION").with_max(32),
        Column::status("STATUS"),
        Column::left("PLATFORM"),
        Column::right("ROUND"),
        Column::right("ACTIONS"),
        Column::right("PID"),
        Column::muted("STARTED"),
        Column::right("DURATION"),
    ]
}

pub fn fill_list(table: &mut Table, states: &[RunState], now: DateTime<Utc>) {
    for state in states {
        table.row(vec![
            state.simulation_id.to_string(),
            state.runner_status.to_string(),
            state.platform.to_string(),
            format_progress(state),
            state.total_actions().to_string(),
            state
                .process_pid
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            format_time_ago(state.started_at, now),
            format_run_duration(state.started_at, state.ended_at, now),
        ]);
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
