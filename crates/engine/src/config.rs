// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration.
//!
//! Defaults, then `<state_dir>/config.toml` if present, then environment
//! overrides:
//!
//! ```toml
//! poll_ms = 1000
//! grace_ms = 5000
//! kill_wait_ms = 2000
//! bridge_capacity = 256
//! list_page_size = 100
//!
//! [worker]
//! program = "python3"
//! args = ["-m", "simworker"]
//! env = { LLM_API_KEY = "..." }
//! ```

use crate::env;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_WORKER: &str = "simrun-worker";

#[derive(Debug, Error)]
pub enum RunnerConfigError {
    #[error("cannot determine state directory; set {}", env::STATE_DIR_ENV)]
    NoStateDir,
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Command used to start a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Default for WorkerCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_WORKER.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }
}

impl WorkerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Root state directory (e.g. ~/.local/state/simrun)
    pub state_dir: PathBuf,
    pub worker: WorkerCommand,
    /// Monitor tick
    pub poll_interval: Duration,
    /// How long a worker gets to exit after SIGTERM
    pub grace_period: Duration,
    /// How long to wait for SIGKILL to be observed
    pub kill_wait: Duration,
    /// Recent events kept per simulation
    pub bridge_capacity: usize,
    /// Records returned by `list`
    pub list_page_size: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    worker: Option<FileWorker>,
    poll_ms: Option<u64>,
    grace_ms: Option<u64>,
    kill_wait_ms: Option<u64>,
    bridge_capacity: Option<usize>,
    list_page_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileWorker {
    program: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

impl RunnerConfig {
    /// Built-in defaults rooted at `state_dir`.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            worker: WorkerCommand::default(),
            poll_interval: Duration::from_secs(1),
            grace_period: Duration::from_secs(5),
            kill_wait: Duration::from_secs(2),
            bridge_capacity: 256,
            list_page_size: 100,
        }
    }

    /// Resolve the state directory from the environment and load from it.
    pub fn load() -> Result<Self, RunnerConfigError> {
        let state_dir = env::state_dir().ok_or(RunnerConfigError::NoStateDir)?;
        Self::load_from(&state_dir)
    }

    /// Defaults, overlaid with `<state_dir>/config.toml` and env overrides.
    pub fn load_from(state_dir: &Path) -> Result<Self, RunnerConfigError> {
        let mut config = Self::new(state_dir);
        let path = state_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: FileConfig = toml::from_str(&content)
                    .map_err(|source| RunnerConfigError::Toml { path, source })?;
                config.apply_file(file)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(RunnerConfigError::Io { path, source }),
        }
        config.apply_env();
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<(), RunnerConfigError> {
        if let Some(worker) = file.worker {
            if let Some(program) = worker.program {
                self.worker.program = program;
            }
            self.worker.args = worker.args;
            self.worker.env = worker.env.into_iter().collect();
        }
        if let Some(ms) = file.poll_ms {
            if ms == 0 {
                return Err(RunnerConfigError::Zero("poll_ms"));
            }
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = file.grace_ms {
            self.grace_period = Duration::from_millis(ms);
        }
        if let Some(ms) = file.kill_wait_ms {
            self.kill_wait = Duration::from_millis(ms);
        }
        if let Some(capacity) = file.bridge_capacity {
            if capacity == 0 {
                return Err(RunnerConfigError::Zero("bridge_capacity"));
            }
            self.bridge_capacity = capacity;
        }
        if let Some(size) = file.list_page_size {
            if size == 0 {
                return Err(RunnerConfigError::Zero("list_page_size"));
            }
            self.list_page_size = size;
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Some(poll) = env::poll_interval() {
            self.poll_interval = poll;
        }
        if let Some(grace) = env::grace_period() {
            self.grace_period = grace;
        }
        if let Some(command) = env::worker_command() {
            if let Some((program, args)) = command.split_first() {
                self.worker.program = program.clone();
                self.worker.args = args.to_vec();
            }
        }
    }

    /// `<state_dir>/simulations`
    pub fn simulations_dir(&self) -> PathBuf {
        self.state_dir.join("simulations")
    }

    pub fn with_worker(mut self, worker: WorkerCommand) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_kill_wait(mut self, kill_wait: Duration) -> Self {
        self.kill_wait = kill_wait;
        self
    }

    pub fn with_bridge_capacity(mut self, capacity: usize) -> Self {
        self.bridge_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
