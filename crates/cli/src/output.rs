// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use simrun_core::{format_elapsed, RunState};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_secs = (now - at).num_seconds().max(0) as u64;
    format_elapsed(elapsed_secs)
}

/// `current/total` rounds; `?` for a total the worker has not reported.
pub fn format_progress(state: &RunState) -> String {
    if state.total_rounds == 0 {
        format!("{}/?", state.current_round)
    } else {
        format!("{}/{}", state.current_round, state.total_rounds)
    }
}

/// Simulated hour of day as `HH:00`.
pub fn format_hour(hour: Option<u32>) -> String {
    match hour {
        Some(h) => format!("{:02}:00", h % 24),
        None => "-".to_string(),
    }
}

/// One-line progress summary used by `start --follow`.
pub fn progress_line(state: &RunState) -> String {
    format!(
        "{}  {}  round {}  hour {}  actions {} (twitter {}, reddit {})",
        state.simulation_id,
        state.runner_status,
        format_progress(state),
        format_hour(Some(state.simulated_hours)),
        state.total_actions(),
        state.twitter_actions_count,
        state.reddit_actions_count,
    )
}
