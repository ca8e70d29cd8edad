// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

/// A running record with no monitor attached, as left by a dead runner.
fn orphan(ctx: &TestContext, id: &str, pid: u32) -> RunState {
    let state = RunState::running_for_test(id, PlatformMode::Twitter, pid);
    ctx.orchestrator.store().save(&state).unwrap();
    state
}

#[tokio::test]
async fn status_of_unknown_simulation_is_none() {
    let ctx = setup();
    assert_eq!(ctx.orchestrator.status("ghost").await.unwrap(), None);
}

#[tokio::test]
async fn status_rejects_unsafe_ids() {
    let ctx = setup();
    let err = ctx.orchestrator.status("../x").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidRequest(_)), "{err}");
}

#[tokio::test]
async fn status_reports_a_live_run() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(state.runner_status, RunnerStatus::Running);
    assert_eq!(state.process_pid, Some(1000));
}

#[tokio::test]
async fn status_completes_a_run_whose_worker_exited_cleanly() {
    let ctx = setup();
    ctx.processes.add_running(4242);
    orphan(&ctx, "sim1", 4242);
    ctx.processes.set_exited(4242, 0);

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Completed);
    assert_eq!(ctx.load("sim1"), Some(state));
}

#[tokio::test]
async fn status_fails_a_crashed_run_with_its_stderr() {
    let ctx = setup();
    ctx.processes.add_running(4242);
    orphan(&ctx, "sim1", 4242);
    ctx.append_stderr("sim1", "RuntimeError: model unavailable\n");
    ctx.processes.set_exited(4242, 1);

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(
        state.last_error.as_deref(),
        Some("RuntimeError: model unavailable")
    );
    assert_eq!(ctx.load("sim1").unwrap().runner_status, RunnerStatus::Failed);
}

#[tokio::test]
async fn status_fails_a_run_whose_worker_vanished() {
    let ctx = setup();
    orphan(&ctx, "sim1", 4242);

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(state.last_error.as_deref(), Some("worker process disappeared"));
}

#[tokio::test]
async fn status_of_a_vanished_worker_carries_its_stderr() {
    let ctx = setup();
    orphan(&ctx, "sim1", 4242);
    ctx.append_stderr(
        "sim1",
        "Traceback (most recent call last):\nRuntimeError: model unavailable\n",
    );

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(
        state.last_error.as_deref(),
        Some("Traceback (most recent call last):\nRuntimeError: model unavailable")
    );
}

#[tokio::test]
async fn status_sees_a_restart_by_another_orchestrator() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.orchestrator.stop("sim1").await.unwrap();
    let stopped = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(stopped.runner_status, RunnerStatus::Stopped);

    let other = ctx.reopen(&ctx.processes);
    other
        .start("sim1", PlatformMode::Twitter, &ctx.config_path)
        .await
        .unwrap();

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(state.runner_status, RunnerStatus::Running);
    assert_eq!(state.process_pid, Some(1001));
    other.shutdown(false).await;
}

#[tokio::test]
async fn status_is_none_once_storage_is_removed() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.orchestrator.stop("sim1").await.unwrap();
    ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    std::fs::remove_dir_all(ctx.sim_dir("sim1")).unwrap();

    assert_eq!(ctx.orchestrator.status("sim1").await.unwrap(), None);
}

#[tokio::test]
async fn status_folds_progress_of_an_unmonitored_run() {
    let ctx = setup();
    ctx.processes.add_running(4242);
    orphan(&ctx, "sim1", 4242);
    ctx.append_stdout(
        "sim1",
        &[round_start("twitter", 2, 9), action("twitter", 2, 1, "REPOST")],
    );

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Running);
    assert_eq!(state.current_round, 2);
    assert_eq!(state.twitter_actions_count, 1);
}

#[tokio::test]
async fn status_keeps_running_when_probe_fails() {
    let ctx = setup();
    ctx.processes.add_running(4242);
    orphan(&ctx, "sim1", 4242);
    ctx.processes.set_exited(4242, 0);
    ctx.processes.fail_next_probes(1);

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(state.runner_status, RunnerStatus::Running);

    let state = ctx.orchestrator.status("sim1").await.unwrap().unwrap();
    assert_eq!(state.runner_status, RunnerStatus::Completed);
}

#[tokio::test]
async fn status_of_corrupt_record_is_an_error() {
    let ctx = setup();
    std::fs::create_dir_all(ctx.sim_dir("sim1")).unwrap();
    std::fs::write(ctx.sim_dir("sim1").join("run_state.json"), "{ nope").unwrap();

    let err = ctx.orchestrator.status("sim1").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Corrupt { .. }), "{err}");
}

#[tokio::test]
async fn list_is_newest_first_and_pages() {
    let ctx = setup();
    for id in ["a", "b", "c"] {
        ctx.start(id, PlatformMode::Twitter).await;
        ctx.clock.advance(Duration::from_secs(60));
    }

    let ids = |states: Vec<RunState>| {
        states
            .into_iter()
            .map(|s| s.simulation_id.to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(ctx.orchestrator.list().await.unwrap()), ["c", "b", "a"]);
    assert_eq!(ids(ctx.orchestrator.list_page(1, 1).await.unwrap()), ["b"]);
    assert!(ctx.orchestrator.list_page(3, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_reconciles_running_entries() {
    let ctx = setup();
    orphan(&ctx, "gone", 4242);
    ctx.start("live", PlatformMode::Twitter).await;

    let states = ctx.orchestrator.list().await.unwrap();
    let status = |id: &str| {
        states
            .iter()
            .find(|s| s.simulation_id == id)
            .map(|s| s.runner_status)
    };
    assert_eq!(status("gone"), Some(RunnerStatus::Failed));
    assert_eq!(status("live"), Some(RunnerStatus::Running));
}

#[tokio::test]
async fn list_of_empty_state_dir_is_empty() {
    let ctx = setup();
    assert!(ctx.orchestrator.list().await.unwrap().is_empty());
}
