// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable execution status of one simulation.
//!
//! A `RunState` is created when a worker is launched, folded forward by the
//! liveness monitor as events arrive, and closed out by exactly one terminal
//! transition (stopped, completed, or failed). Terminal records stay on disk
//! for history.

use crate::event::{EventKind, SimEvent};
use crate::id::{RunId, SimulationId};
use crate::platform::{Platform, PlatformMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerStatus {
    Pending,
    Running,
    Stopped,
    Completed,
    Failed,
}

impl RunnerStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunnerStatus::Stopped | RunnerStatus::Completed | RunnerStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerStatus::Pending => "pending",
            RunnerStatus::Running => "running",
            RunnerStatus::Stopped => "stopped",
            RunnerStatus::Completed => "completed",
            RunnerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte offsets into the worker's logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCursor {
    /// Where this run's stdout begins (the log is append-only across runs).
    pub start: u64,
    /// How far the monitor has consumed complete stdout lines.
    pub offset: u64,
    /// Where this run's stderr begins.
    #[serde(default)]
    pub stderr_start: u64,
}

impl LogCursor {
    pub fn at(start: u64) -> Self {
        Self {
            start,
            offset: start,
            stderr_start: 0,
        }
    }
}

/// Inputs for a freshly launched run.
#[derive(Debug, Clone)]
pub struct RunStateConfig {
    pub simulation_id: SimulationId,
    pub run_id: RunId,
    pub platform: PlatformMode,
    pub config_path: PathBuf,
    pub total_rounds: u32,
    /// Current length of the stdout log
    pub log_start: u64,
    /// Current length of the stderr log
    pub stderr_start: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub simulation_id: SimulationId,
    pub run_id: RunId,
    pub platform: PlatformMode,
    pub config_path: PathBuf,
    pub runner_status: RunnerStatus,
    pub process_pid: Option<u32>,
    pub twitter_running: bool,
    pub reddit_running: bool,
    pub current_round: u32,
    pub total_rounds: u32,
    #[serde(default)]
    pub simulated_hours: u32,
    #[serde(default)]
    pub twitter_actions_count: u64,
    #[serde(default)]
    pub reddit_actions_count: u64,
    #[serde(default)]
    pub twitter_completed: bool,
    #[serde(default)]
    pub reddit_completed: bool,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    #[serde(default)]
    pub log_cursor: LogCursor,
}

impl RunState {
    /// A pending record; becomes running once the worker pid is known.
    pub fn new(config: RunStateConfig, now: DateTime<Utc>) -> Self {
        Self {
            simulation_id: config.simulation_id,
            run_id: config.run_id,
            platform: config.platform,
            config_path: config.config_path,
            runner_status: RunnerStatus::Pending,
            process_pid: None,
            twitter_running: false,
            reddit_running: false,
            current_round: 0,
            total_rounds: config.total_rounds,
            simulated_hours: 0,
            twitter_actions_count: 0,
            reddit_actions_count: 0,
            twitter_completed: false,
            reddit_completed: false,
            started_at: now,
            updated_at: now,
            ended_at: None,
            last_error: None,
            log_cursor: LogCursor {
                stderr_start: config.stderr_start,
                ..LogCursor::at(config.log_start)
            },
        }
    }

    /// Pending → running with the spawned worker's pid.
    pub fn mark_running(&mut self, pid: u32, now: DateTime<Utc>) {
        self.runner_status = RunnerStatus::Running;
        self.process_pid = Some(pid);
        self.twitter_running = self.platform.includes(Platform::Twitter);
        self.reddit_running = self.platform.includes(Platform::Reddit);
        self.started_at = now;
        self.updated_at = now;
    }

    pub fn is_running(&self) -> bool {
        self.runner_status == RunnerStatus::Running
    }

    /// Fold one observed event into the record.
    ///
    /// Returns whether anything changed. Events are ignored unless running;
    /// rounds only move forward and never past `total_rounds`.
    pub fn apply_event(&mut self, event: &SimEvent, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }

        let platform = event.platform.or_else(|| self.platform.sole());
        let mut changed = false;

        match &event.kind {
            EventKind::SimulationStart { total_rounds, .. } => {
                if self.total_rounds == 0 {
                    if let Some(total) = total_rounds.filter(|t| *t > 0) {
                        self.total_rounds = total;
                        changed = true;
                    }
                }
            }
            EventKind::RoundStart {
                round,
                simulated_hour,
            } => {
                changed |= self.advance_round(*round);
                if let Some(hour) = simulated_hour {
                    if *hour != self.simulated_hours {
                        self.simulated_hours = *hour;
                        changed = true;
                    }
                }
            }
            EventKind::RoundEnd { round, .. } => {
                changed |= self.advance_round(*round);
            }
            EventKind::Action(action) => {
                changed |= self.advance_round(action.round);
                match platform {
                    Some(Platform::Twitter) => {
                        self.twitter_actions_count += 1;
                        changed = true;
                    }
                    Some(Platform::Reddit) => {
                        self.reddit_actions_count += 1;
                        changed = true;
                    }
                    None => {}
                }
            }
            EventKind::SimulationEnd { .. } => match platform {
                Some(Platform::Twitter) if !self.twitter_completed => {
                    self.twitter_completed = true;
                    changed = true;
                }
                Some(Platform::Reddit) if !self.reddit_completed => {
                    self.reddit_completed = true;
                    changed = true;
                }
                _ => {}
            },
        }

        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Record how far the stdout log has been consumed.
    pub fn advance_cursor(&mut self, offset: u64, now: DateTime<Utc>) -> bool {
        if offset <= self.log_cursor.offset {
            return false;
        }
        self.log_cursor.offset = offset;
        self.updated_at = now;
        true
    }

    /// Whether every platform this run drives has reported `simulation_end`.
    pub fn all_platforms_completed(&self) -> bool {
        self.platform.platforms().iter().all(|p| match p {
            Platform::Twitter => self.twitter_completed,
            Platform::Reddit => self.reddit_completed,
        })
    }

    pub fn total_actions(&self) -> u64 {
        self.twitter_actions_count + self.reddit_actions_count
    }

    /// Worker exited cleanly.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.close(RunnerStatus::Completed, now);
        if self.total_rounds > 0 && self.all_platforms_completed() {
            self.current_round = self.total_rounds;
        }
    }

    /// Worker crashed or vanished.
    pub fn mark_failed(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.close(RunnerStatus::Failed, now);
        self.last_error = Some(error.into());
    }

    /// Stop was requested and the worker is gone.
    pub fn mark_stopped(&mut self, now: DateTime<Utc>) {
        self.close(RunnerStatus::Stopped, now);
    }

    fn close(&mut self, status: RunnerStatus, now: DateTime<Utc>) {
        self.runner_status = status;
        self.process_pid = None;
        self.twitter_running = false;
        self.reddit_running = false;
        self.ended_at = Some(now);
        self.updated_at = now;
        self.last_error = None;
    }

    fn advance_round(&mut self, round: u32) -> bool {
        let round = round.min(self.total_rounds);
        if round > self.current_round {
            self.current_round = round;
            true
        } else {
            false
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RunState {
    /// A running record for tests.
    pub fn running_for_test(id: &str, platform: PlatformMode, pid: u32) -> Self {
        let now = chrono::Utc::now();
        let mut state = RunState::new(
            RunStateConfig {
                simulation_id: SimulationId::new(id),
                run_id: RunId::new(format!("{id}-run")),
                platform,
                config_path: PathBuf::from(format!("/sims/{id}/simulation_config.json")),
                total_rounds: 24,
                log_start: 0,
                stderr_start: 0,
            },
            now,
        );
        state.mark_running(pid, now);
        state
    }
}

#[cfg(test)]
#[path = "run_state_tests.rs"]
mod tests;
