// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-simulation run records on disk.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<simulation_id>/run_state.json
//! <root>/<simulation_id>/stdout.log
//! <root>/<simulation_id>/stderr.log
//! ```
//!
//! Writes go to a `.tmp` sibling, are fsynced, then renamed over the
//! record so a reader never observes a half-written file.

use simrun_core::{RunState, SimulationId};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const STATE_FILE: &str = "run_state.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt run state for {simulation_id} at {}: {source}", path.display())]
    Corrupt {
        simulation_id: SimulationId,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Directory of run records, one subdirectory per simulation.
#[derive(Debug, Clone)]
pub struct RunStateStore {
    root: PathBuf,
}

impl RunStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sim_dir(&self, id: &SimulationId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn state_path(&self, id: &SimulationId) -> PathBuf {
        self.sim_dir(id).join(STATE_FILE)
    }

    /// Read the record for `id`, `Ok(None)` when none exists.
    pub fn load(&self, id: &SimulationId) -> Result<Option<RunState>, StoreError> {
        let path = self.state_path(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_reader(BufReader::new(file))
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                simulation_id: id.clone(),
                path,
                source,
            })
    }

    /// Durably replace the record for `state.simulation_id`.
    pub fn save(&self, state: &RunState) -> Result<(), StoreError> {
        let dir = self.sim_dir(&state.simulation_id);
        fs::create_dir_all(&dir)?;

        let path = dir.join(STATE_FILE);
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, state)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        File::open(&dir)?.sync_all()?;

        debug!(
            simulation_id = %state.simulation_id,
            status = %state.runner_status,
            "run state saved"
        );
        Ok(())
    }

    /// All readable records, most recently started first.
    ///
    /// Corrupt or unreadable records are skipped with a warning.
    pub fn list(&self) -> Result<Vec<RunState>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut states = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(id) = SimulationId::parse(name) else {
                continue;
            };
            match self.load(&id) {
                Ok(Some(state)) => states.push(state),
                Ok(None) => {}
                Err(e) => warn!(simulation_id = %id, error = %e, "skipping unreadable run state"),
            }
        }

        states.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| a.simulation_id.cmp(&b.simulation_id))
        });
        Ok(states)
    }

    /// Delete the simulation directory (record and logs).
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self, id: &SimulationId) -> Result<bool, StoreError> {
        match fs::remove_dir_all(self.sim_dir(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
