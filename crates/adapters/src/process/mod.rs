// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker process management

mod os;

pub use os::OsProcessAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessAdapter, ProcessCall};

use async_trait::async_trait;
use simrun_core::{PlatformMode, SimulationId};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable carrying the simulation id into the worker
pub const SIMULATION_ID_ENV: &str = "SIMRUN_SIMULATION_ID";
/// Environment variable carrying the platform mode into the worker
pub const PLATFORM_ENV: &str = "SIMRUN_PLATFORM";

/// Errors from launching a worker
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("simulation config not found: {}", .0.display())]
    ConfigMissing(PathBuf),
    #[error("cannot open worker log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn worker {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("worker {program} exited before its pid was known")]
    NoPid { program: String },
}

/// Errors from probing a worker's liveness
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("wait on pid {pid} failed: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("probe of pid {pid} failed: {source}")]
    Probe {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
}

/// Errors from signalling a worker
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid pid: {0}")]
    InvalidPid(u32),
    #[error("failed to signal pid {pid}: {source}")]
    Send {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
}

/// Everything needed to start one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub simulation_id: SimulationId,
    pub platform: PlatformMode,
    pub config_path: PathBuf,
    pub cwd: PathBuf,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    /// Arguments passed to `program`: configured args, then `--config` and `--platform`.
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("--config".to_string());
        args.push(self.config_path.display().to_string());
        args.push("--platform".to_string());
        args.push(self.platform.as_str().to_string());
        args
    }

    /// Configured env plus the simulation id and platform.
    pub fn worker_env(&self) -> Vec<(String, String)> {
        let mut env = self.env.clone();
        env.push((SIMULATION_ID_ENV.to_string(), self.simulation_id.to_string()));
        env.push((PLATFORM_ENV.to_string(), self.platform.as_str().to_string()));
        env
    }
}

/// Observed state of a worker pid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    /// Exit observed: `code` for a normal exit, `signal` when killed.
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// No such process and no recorded exit status.
    Gone,
}

impl ProcessStatus {
    pub fn exited(code: i32) -> Self {
        ProcessStatus::Exited {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signalled(signal: i32) -> Self {
        ProcessStatus::Exited {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }
}

/// Signal used to stop a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGTERM
    Terminate,
    /// SIGKILL
    Kill,
}

impl StopSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopSignal::Terminate => "SIGTERM",
            StopSignal::Kill => "SIGKILL",
        }
    }
}

/// Adapter for launching and supervising worker processes
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    /// Spawn a worker as leader of a new process group; returns its pid.
    async fn launch(&self, spec: &LaunchSpec) -> Result<u32, LaunchError>;

    /// Non-blocking liveness check.
    async fn status(&self, pid: u32) -> Result<ProcessStatus, ProbeError>;

    /// Signal the worker's process group. A process that is already gone
    /// is not an error.
    async fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), SignalError>;

    /// Forget any handle retained for `pid`.
    async fn release(&self, pid: u32);
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
