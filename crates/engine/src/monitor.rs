// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness monitoring of running simulations.
//!
//! One task per running simulation. Every tick it takes the simulation's
//! lock, re-reads the run state, folds new stdout lines into it, probes
//! the worker, and records the exit transition once the worker is gone.
//! The same observation is used by the status read path to self-heal.

use crate::log_paths;
use crate::orchestrator::Inner;
use crate::tail;
use simrun_adapters::{ProcessAdapter, ProcessStatus};
use simrun_core::{Clock, RunId, RunState, SimulationId};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Stderr lines kept as `last_error` when a worker crashes.
pub const STDERR_TAIL_LINES: usize = 20;

/// Handle to a running monitor task.
pub(crate) struct MonitorHandle {
    run_id: RunId,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub(crate) fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Ask the loop to exit without waiting for it.
    ///
    /// Safe while holding the simulation lock: a tick blocked on that lock
    /// re-reads the state afterwards and exits on its own.
    pub(crate) fn cancel_nowait(self) {
        let _ = self.shutdown.send(());
    }

    /// Ask the loop to exit and wait until it has.
    pub(crate) async fn cancel(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }

    /// A handle whose task only waits for shutdown.
    #[cfg(test)]
    pub(crate) fn idle(run_id: RunId) -> Self {
        let (shutdown, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _ = rx.await;
        });
        Self {
            run_id,
            shutdown,
            task,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Watching,
    Done,
}

/// Spawn the monitor loop for one run of `id`.
pub(crate) fn start_monitor<P, C>(inner: Arc<Inner<P, C>>, id: SimulationId, run_id: RunId) -> MonitorHandle
where
    P: ProcessAdapter,
    C: Clock,
{
    let (shutdown, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(monitor_loop(inner, id, run_id.clone(), shutdown_rx));
    MonitorHandle {
        run_id,
        shutdown,
        task,
    }
}

async fn monitor_loop<P, C>(
    inner: Arc<Inner<P, C>>,
    id: SimulationId,
    run_id: RunId,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    P: ProcessAdapter,
    C: Clock,
{
    tracing::debug!(simulation_id = %id, run_id = %run_id, "monitor started");
    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(inner.config.poll_interval) => {
                ticks += 1;
                match inner.tick(&id, &run_id).await {
                    Ok(Tick::Watching) => {
                        tracing::trace!(simulation_id = %id, ticks, "worker alive");
                    }
                    Ok(Tick::Done) => break,
                    Err(e) => {
                        tracing::warn!(simulation_id = %id, error = %e, "monitor tick failed; retrying");
                    }
                }
            }

            _ = &mut shutdown_rx => {
                tracing::debug!(simulation_id = %id, "monitor shutdown requested");
                break;
            }
        }
    }
    let _ = inner.registry.detach_run(&id, &run_id);
    tracing::debug!(simulation_id = %id, run_id = %run_id, ticks, "monitor stopped");
}

impl<P, C> Inner<P, C>
where
    P: ProcessAdapter,
    C: Clock,
{
    async fn tick(
        &self,
        id: &SimulationId,
        run_id: &RunId,
    ) -> Result<Tick, crate::OrchestratorError> {
        let lock = self.registry.lock_for(id);
        let _guard = lock.lock().await;

        let Some(mut state) = self.store.load(id)? else {
            return Ok(Tick::Done);
        };
        if !state.is_running() || state.run_id != *run_id {
            return Ok(Tick::Done);
        }

        if self.observe(&mut state).await {
            self.store.save(&state)?;
        }
        self.registry.remember(&state);

        Ok(if state.is_running() {
            Tick::Watching
        } else {
            Tick::Done
        })
    }

    /// Bring a running record up to date with the log and the process table.
    ///
    /// Caller holds the simulation lock. Returns whether `state` changed;
    /// the caller persists it. Probe failures leave the record running.
    pub(crate) async fn observe(&self, state: &mut RunState) -> bool {
        if !state.is_running() {
            return false;
        }
        let changed = self.fold_log(state);

        let Some(pid) = state.process_pid else {
            tracing::warn!(simulation_id = %state.simulation_id, "running record has no pid");
            state.mark_failed("no worker pid recorded", self.clock.now());
            return true;
        };

        let status = match self.processes.status(pid).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    simulation_id = %state.simulation_id,
                    pid,
                    error = %e,
                    "liveness probe failed"
                );
                return changed;
            }
        };
        if status.is_running() {
            return changed;
        }

        // Drain what the worker wrote before exiting
        self.fold_log(state);
        self.record_exit(state, status);
        self.processes.release(pid).await;
        true
    }

    /// Fold new complete stdout lines into `state` and the bridge.
    pub(crate) fn fold_log(&self, state: &mut RunState) -> bool {
        let path = log_paths::stdout_log_path(&self.store.sim_dir(&state.simulation_id));
        let chunk = match tail::read_lines_from(&path, state.log_cursor.offset) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(
                    simulation_id = %state.simulation_id,
                    path = %path.display(),
                    error = %e,
                    "cannot read worker stdout"
                );
                return false;
            }
        };

        let now = self.clock.now();
        let mut changed = false;
        let mut events = Vec::new();
        for line in &chunk.lines {
            if let Some(event) = self.decoder.decode(line) {
                changed |= state.apply_event(&event, now);
                events.push(event);
            }
        }
        if !events.is_empty() {
            tracing::debug!(
                simulation_id = %state.simulation_id,
                events = events.len(),
                round = state.current_round,
                "folded worker events"
            );
            self.bridge.extend(&state.simulation_id, events);
        }
        changed |= state.advance_cursor(chunk.offset, now);
        changed
    }

    fn record_exit(&self, state: &mut RunState, status: ProcessStatus) {
        let now = self.clock.now();
        let pid = state.process_pid;
        match status {
            ProcessStatus::Exited { code: Some(0), .. } => state.mark_completed(now),
            ProcessStatus::Exited { code, signal } => {
                let reason = self.stderr_tail(state).unwrap_or_else(|| match (code, signal) {
                    (Some(code), _) => format!("worker exited with code {code}"),
                    (None, Some(signal)) => format!("worker terminated by signal {signal}"),
                    (None, None) => "worker terminated by signal".to_string(),
                });
                state.mark_failed(reason, now);
            }
            ProcessStatus::Gone if state.all_platforms_completed() => state.mark_completed(now),
            ProcessStatus::Gone => {
                let reason = self
                    .stderr_tail(state)
                    .unwrap_or_else(|| "worker process disappeared".to_string());
                state.mark_failed(reason, now);
            }
            ProcessStatus::Running => return,
        }

        match &state.last_error {
            None => tracing::info!(
                simulation_id = %state.simulation_id,
                pid = ?pid,
                rounds = state.current_round,
                actions = state.total_actions(),
                "simulation completed"
            ),
            Some(error) => tracing::warn!(
                simulation_id = %state.simulation_id,
                pid = ?pid,
                ?status,
                error = %error,
                "simulation failed"
            ),
        }
    }

    /// Last lines this run wrote to stderr, if any.
    fn stderr_tail(&self, state: &RunState) -> Option<String> {
        let path = log_paths::stderr_log_path(&self.store.sim_dir(&state.simulation_id));
        match tail::tail_lines(&path, state.log_cursor.stderr_start, STDERR_TAIL_LINES) {
            Ok(lines) if !lines.is_empty() => Some(lines.join("\n")),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
