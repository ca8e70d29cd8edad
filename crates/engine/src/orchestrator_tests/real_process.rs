// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end runs against real `sh` workers.

use super::*;
use crate::test_helpers::{fast_config, SIM_CONFIG};
use crate::WorkerCommand;
use simrun_adapters::{OsProcessAdapter, TracedProcess};
use simrun_core::{SystemClock, UuidIdGen};
use std::time::Duration;
use tempfile::TempDir;

type RealOrchestrator = Orchestrator<TracedProcess<OsProcessAdapter>, SystemClock>;

struct RealContext {
    orchestrator: RealOrchestrator,
    config_path: std::path::PathBuf,
    _dir: TempDir,
}

/// Orchestrator whose worker is `sh -c <script>`.
fn real(script: &str) -> RealContext {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("simulation_config.json");
    std::fs::write(&config_path, SIM_CONFIG).unwrap();

    let config = fast_config(dir.path().join("state"))
        .with_worker(WorkerCommand::new("sh").args(["-c", script, "worker"]));
    let orchestrator = Orchestrator::new(
        config,
        OrchestratorDeps {
            processes: TracedProcess::new(OsProcessAdapter::new()),
            clock: SystemClock,
            ids: Arc::new(UuidIdGen),
        },
    );
    RealContext {
        orchestrator,
        config_path,
        _dir: dir,
    }
}

impl RealContext {
    async fn start(&self, mode: PlatformMode) -> RunState {
        self.orchestrator
            .start("sim1", mode, &self.config_path)
            .await
            .unwrap()
    }

    async fn wait_terminal(&self) -> RunState {
        for _ in 0..500 {
            let state = self.orchestrator.status("sim1").await.unwrap().unwrap();
            if state.runner_status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("simulation never finished");
    }
}

#[tokio::test]
async fn worker_output_is_folded_until_clean_exit() {
    let script = format!(
        "echo 'starting up'; echo '{}'; echo '{}'; echo '{}'",
        round_start("twitter", 1, 8),
        action("twitter", 1, 4, "CREATE_POST"),
        simulation_end("twitter"),
    );
    let ctx = real(&script);
    ctx.start(PlatformMode::Twitter).await;

    let state = ctx.wait_terminal().await;

    assert_eq!(state.runner_status, RunnerStatus::Completed);
    assert_eq!(state.twitter_actions_count, 1);
    assert_eq!(state.current_round, 24);
    assert!(state.twitter_completed);
}

#[tokio::test]
async fn worker_receives_config_and_platform() {
    let ctx = real(r#"echo "$1 $2 $3 $4 $SIMRUN_SIMULATION_ID" >&2; exit 7"#);
    let started = ctx.start(PlatformMode::Reddit).await;

    let state = ctx.wait_terminal().await;

    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(
        state.last_error,
        Some(format!(
            "--config {} --platform reddit sim1",
            started.config_path.display()
        ))
    );
}

#[tokio::test]
async fn crash_without_stderr_reports_exit_code() {
    let ctx = real("exit 4");
    ctx.start(PlatformMode::Twitter).await;

    let state = ctx.wait_terminal().await;
    assert_eq!(state.last_error.as_deref(), Some("worker exited with code 4"));
}

#[tokio::test]
async fn worker_killed_out_of_band_is_failed() {
    let ctx = real("exec sleep 30");
    let pid = ctx.start(PlatformMode::Twitter).await.process_pid.unwrap();

    let killed = std::process::Command::new("kill")
        .args(["-9", &pid.to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let state = ctx.wait_terminal().await;
    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(
        state.last_error.as_deref(),
        Some("worker terminated by signal 9")
    );
}

#[tokio::test]
async fn stop_terminates_a_real_worker() {
    let ctx = real("exec sleep 30");
    ctx.start(PlatformMode::Twitter).await;

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Stopped);
    assert_eq!(state.process_pid, None);
}

#[tokio::test]
async fn stop_kills_a_worker_that_ignores_sigterm() {
    let ctx = real("trap '' TERM; echo ready; while true; do sleep 0.05; done");
    ctx.start(PlatformMode::Twitter).await;
    // Let the trap install before signalling
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Stopped);
    let again = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(again.runner_status, RunnerStatus::Stopped);
}
