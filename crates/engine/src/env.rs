// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;
use std::time::Duration;

pub const STATE_DIR_ENV: &str = "SIMRUN_STATE_DIR";
pub const POLL_MS_ENV: &str = "SIMRUN_POLL_MS";
pub const GRACE_MS_ENV: &str = "SIMRUN_GRACE_MS";
pub const WORKER_ENV: &str = "SIMRUN_WORKER";

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Resolve state directory: SIMRUN_STATE_DIR > XDG_STATE_HOME/simrun > ~/.local/state/simrun
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join("simrun"));
        }
    }
    dirs::home_dir().map(|home| home.join(".local/state/simrun"))
}

/// Monitor poll interval override
pub fn poll_interval() -> Option<Duration> {
    parse_duration_ms(POLL_MS_ENV).filter(|d| !d.is_zero())
}

/// Stop grace period override
pub fn grace_period() -> Option<Duration> {
    parse_duration_ms(GRACE_MS_ENV)
}

/// Worker command override, split on whitespace: program then args.
pub fn worker_command() -> Option<Vec<String>> {
    let raw = std::env::var(WORKER_ENV).ok()?;
    let parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
