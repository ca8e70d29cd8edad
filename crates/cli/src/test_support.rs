// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator fixture for command handler tests.

use simrun_adapters::FakeProcessAdapter;
use simrun_core::{FakeClock, SequentialIdGen};
use simrun_engine::{Orchestrator, OrchestratorDeps, RunnerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub type TestOrchestrator = Orchestrator<FakeProcessAdapter, FakeClock>;

pub struct Fixture {
    pub orchestrator: TestOrchestrator,
    pub processes: FakeProcessAdapter,
    pub config_path: PathBuf,
    pub dir: TempDir,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("simulation_config.json");
    std::fs::write(
        &config_path,
        r#"{"time_config": {"total_simulation_hours": 24, "minutes_per_round": 60}}"#,
    )
    .unwrap();

    let processes = FakeProcessAdapter::new();
    let config = RunnerConfig::new(dir.path().join("state"))
        .with_poll_interval(Duration::from_millis(10))
        .with_grace_period(Duration::from_millis(100))
        .with_kill_wait(Duration::from_millis(50));
    let orchestrator = Orchestrator::new(
        config,
        OrchestratorDeps {
            processes: processes.clone(),
            clock: FakeClock::new(),
            ids: Arc::new(SequentialIdGen::new("run")),
        },
    );

    Fixture {
        orchestrator,
        processes,
        config_path,
        dir,
    }
}
