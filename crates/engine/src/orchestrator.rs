// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control surface for simulation runs.
//!
//! Every read-modify-write of a simulation's run state happens under that
//! simulation's lock and starts by re-reading the record from disk.

use crate::bridge::ActionBridge;
use crate::config::RunnerConfig;
use crate::decoder::{JsonLineDecoder, LineDecoder};
use crate::error::OrchestratorError;
use crate::history::{self, ActionFilter, ActionPage, AgentStats, RoundSummary};
use crate::log_paths;
use crate::monitor::start_monitor;
use crate::registry::Registry;
use crate::tail;
use simrun_adapters::{LaunchError, LaunchSpec, ProcessAdapter, ProcessStatus, StopSignal};
use simrun_core::{
    Clock, IdGen, PlatformMode, RunId, RunState, RunStateConfig, SimEvent, SimulationConfig,
    SimulationId,
};
use simrun_storage::RunStateStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How often `stop` re-probes a signalled worker.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Orchestrator adapter dependencies
pub struct OrchestratorDeps<P, C> {
    pub processes: P,
    pub clock: C,
    pub ids: Arc<dyn IdGen>,
}

/// How a stopped worker went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Exited within the grace period after SIGTERM
    Terminated,
    /// Needed SIGKILL
    Escalated,
}

/// Result of startup reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Running records whose worker is alive; monitoring resumed
    pub reattached: usize,
    /// Running records whose worker was gone; exit recorded
    pub finalized: usize,
}

pub(crate) struct Inner<P, C> {
    pub(crate) config: RunnerConfig,
    pub(crate) store: RunStateStore,
    pub(crate) processes: P,
    pub(crate) clock: C,
    pub(crate) ids: Arc<dyn IdGen>,
    pub(crate) decoder: Arc<dyn LineDecoder>,
    pub(crate) bridge: ActionBridge,
    pub(crate) registry: Registry,
}

/// Starts, stops, and reports on simulation runs.
pub struct Orchestrator<P, C> {
    inner: Arc<Inner<P, C>>,
}

impl<P, C> Clone for Orchestrator<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn parse_id(raw: &str) -> Result<SimulationId, OrchestratorError> {
    Ok(SimulationId::parse(raw)?)
}

impl<P, C> Orchestrator<P, C>
where
    P: ProcessAdapter,
    C: Clock,
{
    /// Create an orchestrator with the JSON action-log decoder.
    pub fn new(config: RunnerConfig, deps: OrchestratorDeps<P, C>) -> Self {
        Self::with_decoder(config, deps, Arc::new(JsonLineDecoder))
    }

    pub fn with_decoder(
        config: RunnerConfig,
        deps: OrchestratorDeps<P, C>,
        decoder: Arc<dyn LineDecoder>,
    ) -> Self {
        let inner = Inner {
            store: RunStateStore::new(config.simulations_dir()),
            bridge: ActionBridge::new(config.bridge_capacity),
            config,
            processes: deps.processes,
            clock: deps.clock,
            ids: deps.ids,
            decoder,
            registry: Registry::default(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create an orchestrator and reconcile what is on disk.
    pub async fn open(
        config: RunnerConfig,
        deps: OrchestratorDeps<P, C>,
    ) -> Result<Self, OrchestratorError> {
        let orchestrator = Self::new(config, deps);
        let summary = orchestrator.reconcile().await?;
        tracing::info!(
            reattached = summary.reattached,
            finalized = summary.finalized,
            "orchestrator ready"
        );
        Ok(orchestrator)
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &RunStateStore {
        &self.inner.store
    }

    /// Up to `limit` recently observed events, oldest first.
    pub fn recent_events(&self, simulation_id: &SimulationId, limit: usize) -> Vec<SimEvent> {
        self.inner.bridge.recent(simulation_id, limit)
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Arc<Inner<P, C>> {
        &self.inner
    }

    /// Simulations with an attached monitor.
    pub fn active_monitors(&self) -> Vec<SimulationId> {
        self.inner.registry.monitored()
    }

    /// Launch a worker for `simulation_id` and start monitoring it.
    pub async fn start(
        &self,
        simulation_id: &str,
        platform: PlatformMode,
        config_path: &Path,
    ) -> Result<RunState, OrchestratorError> {
        let id = parse_id(simulation_id)?;
        let inner = &self.inner;
        let lock = inner.registry.lock_for(&id);
        let _guard = lock.lock().await;

        if let Some(existing) = inner.store.load(&id)? {
            self.check_not_running(&existing).await?;
        }
        if let Some(previous) = inner.registry.detach(&id) {
            previous.cancel_nowait();
        }

        if !config_path.is_file() {
            return Err(LaunchError::ConfigMissing(config_path.to_path_buf()).into());
        }
        let config_path = config_path
            .canonicalize()
            .map_err(|_| LaunchError::ConfigMissing(config_path.to_path_buf()))?;
        let sim_config = SimulationConfig::load(&config_path)?;
        let total_rounds = sim_config.total_rounds()?;

        let sim_dir = inner.store.sim_dir(&id);
        std::fs::create_dir_all(&sim_dir)?;
        let stdout_log = log_paths::stdout_log_path(&sim_dir);
        let stderr_log = log_paths::stderr_log_path(&sim_dir);
        let log_start = tail::file_len(&stdout_log)?;
        let stderr_start = tail::file_len(&stderr_log)?;

        let spec = LaunchSpec {
            simulation_id: id.clone(),
            platform,
            config_path: config_path.clone(),
            cwd: sim_dir,
            stdout_log,
            stderr_log,
            program: inner.config.worker.program.clone(),
            args: inner.config.worker.args.clone(),
            env: inner.config.worker.env.clone(),
        };
        let pid = inner.processes.launch(&spec).await?;

        let now = inner.clock.now();
        let mut state = RunState::new(
            RunStateConfig {
                simulation_id: id.clone(),
                run_id: RunId::new(inner.ids.next()),
                platform,
                config_path,
                total_rounds,
                log_start,
                stderr_start,
            },
            now,
        );
        state.mark_running(pid, now);

        if let Err(e) = inner.store.save(&state) {
            tracing::error!(simulation_id = %id, pid, error = %e, "cannot persist run state; killing worker");
            let _ = inner.processes.signal(pid, StopSignal::Kill).await;
            inner.processes.release(pid).await;
            return Err(e.into());
        }

        inner.bridge.clear(&id);
        inner.registry.remember(&state);
        let handle = start_monitor(Arc::clone(&self.inner), id.clone(), state.run_id.clone());
        inner.registry.attach(id.clone(), handle);

        tracing::info!(
            simulation_id = %id,
            run_id = %state.run_id,
            pid,
            platform = %platform,
            total_rounds,
            "simulation started"
        );
        Ok(state)
    }

    /// A running record blocks a new start only while its worker is alive.
    async fn check_not_running(&self, existing: &RunState) -> Result<(), OrchestratorError> {
        if !existing.is_running() {
            return Ok(());
        }
        let Some(pid) = existing.process_pid else {
            return Ok(());
        };
        match self.inner.processes.status(pid).await {
            Ok(ProcessStatus::Running) => Err(OrchestratorError::AlreadyRunning {
                simulation_id: existing.simulation_id.clone(),
                pid,
            }),
            Ok(status) => {
                tracing::info!(
                    simulation_id = %existing.simulation_id,
                    pid,
                    ?status,
                    "replacing stale running state"
                );
                self.inner.processes.release(pid).await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    simulation_id = %existing.simulation_id,
                    pid,
                    error = %e,
                    "cannot confirm previous worker is gone"
                );
                Err(OrchestratorError::AlreadyRunning {
                    simulation_id: existing.simulation_id.clone(),
                    pid,
                })
            }
        }
    }

    /// Stop a running simulation: SIGTERM, grace period, then SIGKILL.
    ///
    /// Records that are not running are returned unchanged.
    pub async fn stop(&self, simulation_id: &str) -> Result<RunState, OrchestratorError> {
        let id = parse_id(simulation_id)?;
        let inner = &self.inner;
        let lock = inner.registry.lock_for(&id);
        let _guard = lock.lock().await;

        let mut state = inner
            .store
            .load(&id)?
            .ok_or_else(|| OrchestratorError::NotFound(id.clone()))?;

        // An exit that happened before the request is recorded as observed
        if inner.observe(&mut state).await {
            inner.store.save(&state)?;
        }
        if !state.is_running() {
            inner.registry.remember(&state);
            return Ok(state);
        }

        if let Some(pid) = state.process_pid {
            let outcome = self.terminate(pid).await?;
            tracing::info!(simulation_id = %id, pid, ?outcome, "worker stopped");
            inner.fold_log(&mut state);
            inner.processes.release(pid).await;
        }

        state.mark_stopped(inner.clock.now());
        inner.store.save(&state)?;
        inner.registry.remember(&state);
        if let Some(monitor) = inner.registry.detach(&id) {
            monitor.cancel_nowait();
        }

        tracing::info!(simulation_id = %id, "simulation stopped");
        Ok(state)
    }

    async fn terminate(&self, pid: u32) -> Result<StopOutcome, OrchestratorError> {
        let inner = &self.inner;
        inner.processes.signal(pid, StopSignal::Terminate).await?;
        if self.wait_for_exit(pid, inner.config.grace_period).await {
            return Ok(StopOutcome::Terminated);
        }

        tracing::warn!(
            pid,
            grace_ms = inner.config.grace_period.as_millis() as u64,
            "worker ignored SIGTERM; escalating to SIGKILL"
        );
        inner.processes.signal(pid, StopSignal::Kill).await?;
        if !self.wait_for_exit(pid, inner.config.kill_wait).await {
            tracing::warn!(pid, "worker still present after SIGKILL");
        }
        Ok(StopOutcome::Escalated)
    }

    /// Poll until `pid` is no longer running or `timeout` passes.
    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.inner.processes.status(pid).await {
                Ok(status) if !status.is_running() => return true,
                Ok(_) => {}
                Err(e) => tracing::debug!(pid, error = %e, "probe failed while waiting for exit"),
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(STOP_POLL.min(deadline - now)).await;
        }
    }

    /// Current run state, reconciled with the process table.
    ///
    /// The store is always read. A terminal record that still matches the
    /// cached run is returned without probing. Anything else waits on the
    /// simulation lock, so a concurrent `stop` can delay this call by up to
    /// the grace period plus the kill wait.
    ///
    /// A running record whose worker is gone takes its exit transition here.
    pub async fn status(&self, simulation_id: &str) -> Result<Option<RunState>, OrchestratorError> {
        let id = parse_id(simulation_id)?;
        if let Some(cached) = self.inner.registry.cached(&id) {
            match self.inner.store.load(&id)? {
                None => {
                    self.inner.registry.forget(&id);
                    return Ok(None);
                }
                Some(disk)
                    if disk.runner_status.is_terminal()
                        && disk.run_id == cached.run_id
                        && disk.updated_at == cached.updated_at =>
                {
                    return Ok(Some(disk));
                }
                Some(_) => {}
            }
        }
        let lock = self.inner.registry.lock_for(&id);
        let _guard = lock.lock().await;
        self.refresh(&id).await
    }

    /// Caller holds the simulation lock.
    async fn refresh(&self, id: &SimulationId) -> Result<Option<RunState>, OrchestratorError> {
        let inner = &self.inner;
        let Some(mut state) = inner.store.load(id)? else {
            inner.registry.forget(id);
            return Ok(None);
        };
        if inner.observe(&mut state).await {
            inner.store.save(&state)?;
        }
        inner.registry.remember(&state);
        Ok(Some(state))
    }

    /// The first page of run states, newest first.
    pub async fn list(&self) -> Result<Vec<RunState>, OrchestratorError> {
        self.list_page(0, self.inner.config.list_page_size).await
    }

    /// Run states newest first, skipping `offset`, at most `limit`.
    pub async fn list_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RunState>, OrchestratorError> {
        let states = self.inner.store.list()?;
        let mut page = Vec::with_capacity(limit.min(states.len()));
        for state in states.into_iter().skip(offset).take(limit) {
            if !state.is_running() {
                page.push(state);
                continue;
            }
            let lock = self.inner.registry.lock_for(&state.simulation_id);
            let _guard = lock.lock().await;
            if let Some(fresh) = self.refresh(&state.simulation_id).await? {
                page.push(fresh);
            }
        }
        Ok(page)
    }

    fn require(&self, simulation_id: &str) -> Result<RunState, OrchestratorError> {
        let id = parse_id(simulation_id)?;
        self.inner
            .store
            .load(&id)?
            .ok_or(OrchestratorError::NotFound(id))
    }

    /// Events decoded from the current run's part of the stdout log.
    fn run_events(&self, state: &RunState) -> Result<Vec<SimEvent>, OrchestratorError> {
        let sim_dir = self.inner.store.sim_dir(&state.simulation_id);
        let chunk = tail::read_lines_from(
            &log_paths::stdout_log_path(&sim_dir),
            state.log_cursor.start,
        )?;
        Ok(chunk
            .lines
            .iter()
            .filter_map(|line| self.inner.decoder.decode(line))
            .collect())
    }

    /// Agent actions of the current run, newest first.
    pub async fn actions(
        &self,
        simulation_id: &str,
        filter: &ActionFilter,
    ) -> Result<ActionPage, OrchestratorError> {
        let state = self.require(simulation_id)?;
        let events = self.run_events(&state)?;
        Ok(history::actions(&events, state.platform, filter))
    }

    /// Per-round summary of the current run.
    pub async fn timeline(&self, simulation_id: &str) -> Result<Vec<RoundSummary>, OrchestratorError> {
        let state = self.require(simulation_id)?;
        let events = self.run_events(&state)?;
        Ok(history::timeline(&events, state.platform))
    }

    /// Per-agent totals of the current run, most active first.
    pub async fn agent_stats(&self, simulation_id: &str) -> Result<Vec<AgentStats>, OrchestratorError> {
        let state = self.require(simulation_id)?;
        let events = self.run_events(&state)?;
        Ok(history::agent_stats(&events, state.platform))
    }

    /// Re-attach monitors to live workers and record exits of dead ones.
    pub async fn reconcile(&self) -> Result<ReconcileSummary, OrchestratorError> {
        let inner = &self.inner;
        let mut summary = ReconcileSummary::default();

        for listed in inner.store.list()? {
            if !listed.is_running() {
                continue;
            }
            let id = listed.simulation_id;
            let lock = inner.registry.lock_for(&id);
            let _guard = lock.lock().await;

            let Some(mut state) = inner.store.load(&id)? else {
                continue;
            };
            if !state.is_running() {
                continue;
            }
            if inner.observe(&mut state).await {
                inner.store.save(&state)?;
            }
            inner.registry.remember(&state);

            if !state.is_running() {
                summary.finalized += 1;
                continue;
            }
            if !inner.registry.is_monitored(&id) {
                let handle = start_monitor(Arc::clone(&self.inner), id.clone(), state.run_id.clone());
                inner.registry.attach(id.clone(), handle);
                summary.reattached += 1;
                tracing::info!(
                    simulation_id = %id,
                    pid = ?state.process_pid,
                    offset = state.log_cursor.offset,
                    "re-attached monitor"
                );
            }
        }
        Ok(summary)
    }

    /// Stop every monitor. With `kill`, stop every running simulation first;
    /// otherwise workers keep running and the next `reconcile` picks them up.
    pub async fn shutdown(&self, kill: bool) {
        let inner = &self.inner;
        if kill {
            match inner.store.list() {
                Ok(states) => {
                    for state in states.into_iter().filter(RunState::is_running) {
                        if let Err(e) = self.stop(state.simulation_id.as_str()).await {
                            tracing::warn!(
                                simulation_id = %state.simulation_id,
                                error = %e,
                                "failed to stop simulation during shutdown"
                            );
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "cannot list simulations during shutdown"),
            }
        }

        for (id, monitor) in inner.registry.drain_monitors() {
            monitor.cancel().await;
            tracing::debug!(simulation_id = %id, "monitor detached");
        }
        inner.registry.clear_cache();
        tracing::info!(kill, "orchestrator shut down");
    }

    /// Delete a finished simulation's record and logs.
    pub async fn purge(&self, simulation_id: &str) -> Result<RunState, OrchestratorError> {
        let id = parse_id(simulation_id)?;
        let inner = &self.inner;
        let lock = inner.registry.lock_for(&id);
        let _guard = lock.lock().await;

        let mut state = inner
            .store
            .load(&id)?
            .ok_or_else(|| OrchestratorError::NotFound(id.clone()))?;
        if inner.observe(&mut state).await {
            inner.store.save(&state)?;
        }
        if state.is_running() {
            return Err(OrchestratorError::StillRunning(id));
        }

        inner.store.remove(&id)?;
        inner.registry.forget(&id);
        inner.bridge.clear(&id);
        if let Some(monitor) = inner.registry.detach(&id) {
            monitor.cancel_nowait();
        }
        tracing::info!(simulation_id = %id, "simulation purged");
        Ok(state)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests/mod.rs"]
mod tests;
