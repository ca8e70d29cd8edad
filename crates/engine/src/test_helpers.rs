// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{Orchestrator, OrchestratorDeps, RunnerConfig};
use simrun_adapters::FakeProcessAdapter;
use simrun_core::{FakeClock, RunState, SequentialIdGen, SimulationId};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Convenience alias for the fully-typed test orchestrator.
pub(crate) type TestOrchestrator = Orchestrator<FakeProcessAdapter, FakeClock>;

/// 24 one-hour rounds.
pub(crate) const SIM_CONFIG: &str =
    r#"{"time_config": {"total_simulation_hours": 24, "minutes_per_round": 60}}"#;

/// Test context holding the orchestrator, its fakes, and a temp state dir.
pub(crate) struct TestContext {
    pub orchestrator: TestOrchestrator,
    pub processes: FakeProcessAdapter,
    pub clock: FakeClock,
    pub config_path: PathBuf,
    pub dir: TempDir,
}

/// Short intervals so monitor and stop tests finish quickly.
pub(crate) fn fast_config(state_dir: impl Into<PathBuf>) -> RunnerConfig {
    RunnerConfig::new(state_dir)
        .with_poll_interval(Duration::from_millis(10))
        .with_grace_period(Duration::from_millis(200))
        .with_kill_wait(Duration::from_millis(100))
}

pub(crate) fn setup() -> TestContext {
    setup_with(|config| config)
}

pub(crate) fn setup_with(tweak: impl FnOnce(RunnerConfig) -> RunnerConfig) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("simulation_config.json");
    std::fs::write(&config_path, SIM_CONFIG).unwrap();

    let processes = FakeProcessAdapter::new();
    let clock = FakeClock::new();
    let orchestrator = Orchestrator::new(
        tweak(fast_config(dir.path().join("state"))),
        deps(&processes, &clock),
    );

    TestContext {
        orchestrator,
        processes,
        clock,
        config_path,
        dir,
    }
}

pub(crate) fn deps(
    processes: &FakeProcessAdapter,
    clock: &FakeClock,
) -> OrchestratorDeps<FakeProcessAdapter, FakeClock> {
    OrchestratorDeps {
        processes: processes.clone(),
        clock: clock.clone(),
        ids: Arc::new(SequentialIdGen::new("run")),
    }
}

impl TestContext {
    /// A second orchestrator over the same state dir, as after a restart.
    pub fn reopen(&self, processes: &FakeProcessAdapter) -> TestOrchestrator {
        Orchestrator::new(
            self.orchestrator.config().clone(),
            deps(processes, &self.clock),
        )
    }

    pub fn sim_dir(&self, id: &str) -> PathBuf {
        self.orchestrator.store().sim_dir(&SimulationId::new(id))
    }

    pub fn append_stdout(&self, id: &str, lines: &[String]) {
        self.append_stdout_raw(id, &format!("{}\n", lines.join("\n")));
    }

    /// Append without a trailing newline.
    pub fn append_stdout_raw(&self, id: &str, text: &str) {
        append(&crate::log_paths::stdout_log_path(&self.sim_dir(id)), text);
    }

    pub fn append_stderr(&self, id: &str, text: &str) {
        append(&crate::log_paths::stderr_log_path(&self.sim_dir(id)), text);
    }

    pub fn load(&self, id: &str) -> Option<RunState> {
        self.orchestrator
            .store()
            .load(&SimulationId::new(id))
            .unwrap()
    }

    /// Poll the store until `done` holds, failing after two seconds.
    pub async fn wait_for(&self, id: &str, done: impl Fn(&RunState) -> bool) -> RunState {
        for _ in 0..200 {
            if let Some(state) = self.load(id) {
                if done(&state) {
                    return state;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {id}: {:?}", self.load(id));
    }

    pub async fn start(&self, id: &str, mode: simrun_core::PlatformMode) -> RunState {
        self.orchestrator
            .start(id, mode, &self.config_path)
            .await
            .unwrap()
    }
}

fn append(path: &std::path::Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

pub(crate) fn round_start(platform: &str, round: u32, hour: u32) -> String {
    format!(
        r#"{{"timestamp":"2026-01-01T00:00:00","platform":"{platform}","event_type":"round_start","round":{round},"simulated_hour":{hour}}}"#
    )
}

pub(crate) fn action(platform: &str, round: u32, agent_id: i64, action_type: &str) -> String {
    format!(
        r#"{{"timestamp":"2026-01-01T00:00:00","platform":"{platform}","round":{round},"agent_id":{agent_id},"agent_name":"agent{agent_id}","action_type":"{action_type}","action_args":{{}},"success":true}}"#
    )
}

pub(crate) fn simulation_end(platform: &str) -> String {
    format!(
        r#"{{"timestamp":"2026-01-01T00:00:00","platform":"{platform}","event_type":"simulation_end","total_rounds":24}}"#
    )
}
