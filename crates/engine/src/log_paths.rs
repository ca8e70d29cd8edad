// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared path builders for runner and worker log files.
//!
//! Layout:
//!   `<state_dir>/simrun.log`
//!   `<state_dir>/simulations/<simulation_id>/stdout.log`
//!   `<state_dir>/simulations/<simulation_id>/stderr.log`

use std::path::{Path, PathBuf};

/// Build the path to the runner's own tracing log.
///
/// Structure: `{state_dir}/simrun.log`
pub fn runner_log_path(state_dir: &Path) -> PathBuf {
    state_dir.join("simrun.log")
}

/// Build the path to a worker's stdout (the action log).
///
/// Structure: `{sim_dir}/stdout.log`
pub fn stdout_log_path(sim_dir: &Path) -> PathBuf {
    sim_dir.join("stdout.log")
}

/// Build the path to a worker's stderr.
///
/// Structure: `{sim_dir}/stderr.log`
pub fn stderr_log_path(sim_dir: &Path) -> PathBuf {
    sim_dir.join("stderr.log")
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
