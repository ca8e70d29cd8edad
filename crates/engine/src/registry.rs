// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory bookkeeping owned by one orchestrator.
//!
//! Holds the per-simulation lock table, the attached monitors, and a cache
//! of the last run state seen. None of it is authoritative: the store is.

use crate::monitor::MonitorHandle;
use parking_lot::Mutex;
use simrun_core::{RunId, RunState, SimulationId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct Registry {
    locks: Mutex<HashMap<SimulationId, Arc<tokio::sync::Mutex<()>>>>,
    monitors: Mutex<HashMap<SimulationId, MonitorHandle>>,
    cache: Mutex<HashMap<SimulationId, RunState>>,
}

impl Registry {
    /// The lock serializing every read-modify-write of `id`'s run state.
    pub(crate) fn lock_for(&self, id: &SimulationId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(id.clone()).or_default().clone()
    }

    /// Attach a monitor, returning the one it replaces.
    pub(crate) fn attach(&self, id: SimulationId, handle: MonitorHandle) -> Option<MonitorHandle> {
        self.monitors.lock().insert(id, handle)
    }

    pub(crate) fn detach(&self, id: &SimulationId) -> Option<MonitorHandle> {
        self.monitors.lock().remove(id)
    }

    /// Detach the monitor for `id` only if it belongs to `run_id`.
    pub(crate) fn detach_run(&self, id: &SimulationId, run_id: &RunId) -> Option<MonitorHandle> {
        let mut monitors = self.monitors.lock();
        if monitors.get(id).is_some_and(|h| h.run_id() == run_id) {
            monitors.remove(id)
        } else {
            None
        }
    }

    pub(crate) fn is_monitored(&self, id: &SimulationId) -> bool {
        self.monitors.lock().contains_key(id)
    }

    pub(crate) fn monitored(&self) -> Vec<SimulationId> {
        let mut ids: Vec<_> = self.monitors.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub(crate) fn drain_monitors(&self) -> Vec<(SimulationId, MonitorHandle)> {
        self.monitors.lock().drain().collect()
    }

    pub(crate) fn cached(&self, id: &SimulationId) -> Option<RunState> {
        self.cache.lock().get(id).cloned()
    }

    pub(crate) fn remember(&self, state: &RunState) {
        self.cache
            .lock()
            .insert(state.simulation_id.clone(), state.clone());
    }

    pub(crate) fn forget(&self, id: &SimulationId) {
        self.cache.lock().remove(id);
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
