// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner log setup: tracing goes to `<state_dir>/simrun.log`, never the
//! terminal, so command output stays clean.

use anyhow::{Context, Result};
use simrun_engine::log_paths;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Filter from `SIMRUN_LOG` / `RUST_LOG`, falling back to `info`.
pub fn filter() -> EnvFilter {
    crate::env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(state_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = log_paths::runner_log_path(state_dir);
    let (Some(dir), Some(file_name)) = (log_path.parent(), log_path.file_name()) else {
        anyhow::bail!("invalid runner log path {}", log_path.display());
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create state directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("cannot install log subscriber")?;

    Ok(guard)
}
