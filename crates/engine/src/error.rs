// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestrator

use simrun_adapters::{LaunchError, SignalError};
use simrun_core::{ConfigError, IdError, SimulationId};
use simrun_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by [`crate::Orchestrator`] operations
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("simulation not found: {0}")]
    NotFound(SimulationId),
    #[error("simulation {simulation_id} is already running (pid {pid})")]
    AlreadyRunning {
        simulation_id: SimulationId,
        pid: u32,
    },
    #[error("simulation {0} is still running; stop it first")]
    StillRunning(SimulationId),
    #[error("launch failed: {0}")]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("corrupt run state for {simulation_id}: {source}")]
    Corrupt {
        simulation_id: SimulationId,
        #[source]
        source: serde_json::Error,
    },
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for OrchestratorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Corrupt {
                simulation_id,
                source,
                ..
            } => OrchestratorError::Corrupt {
                simulation_id,
                source,
            },
            other => OrchestratorError::Store(other),
        }
    }
}

impl From<IdError> for OrchestratorError {
    fn from(e: IdError) -> Self {
        OrchestratorError::InvalidRequest(e.to_string())
    }
}
