// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn stop_terminates_worker_and_marks_stopped() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Parallel).await;

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Stopped);
    assert_eq!(state.process_pid, None);
    assert!(!state.twitter_running && !state.reddit_running);
    assert!(state.ended_at.is_some());
    assert_eq!(ctx.processes.signals(1000), vec![StopSignal::Terminate]);
    assert!(!ctx.processes.is_tracked(1000));
    assert!(ctx.orchestrator.active_monitors().is_empty());
    assert_eq!(ctx.load("sim1"), Some(state));
}

#[tokio::test]
async fn stop_escalates_when_sigterm_is_ignored() {
    let ctx = setup();
    ctx.processes.ignore_terminate(true);
    ctx.start("sim1", PlatformMode::Twitter).await;

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Stopped);
    assert_eq!(
        ctx.processes.signals(1000),
        vec![StopSignal::Terminate, StopSignal::Kill]
    );
    assert_eq!(ctx.processes.current_status(1000), ProcessStatus::signalled(9));
}

#[tokio::test]
async fn stop_is_idempotent() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;

    let first = ctx.orchestrator.stop("sim1").await.unwrap();
    let second = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.processes.signals(1000).len(), 1);
}

#[tokio::test]
async fn concurrent_stops_signal_once() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;

    let (a, b) = tokio::join!(ctx.orchestrator.stop("sim1"), ctx.orchestrator.stop("sim1"));

    assert_eq!(a.unwrap().runner_status, RunnerStatus::Stopped);
    assert_eq!(b.unwrap().runner_status, RunnerStatus::Stopped);
    assert_eq!(ctx.processes.signals(1000), vec![StopSignal::Terminate]);
}

#[tokio::test]
async fn stop_unknown_simulation_is_not_found() {
    let ctx = setup();
    let err = ctx.orchestrator.stop("ghost").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound(ref id) if *id == "ghost"), "{err}");
}

#[tokio::test]
async fn stop_after_exit_keeps_the_observed_outcome() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.processes.set_exited(1000, 0);

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Completed);
    assert!(ctx.processes.signals(1000).is_empty());
}

#[tokio::test]
async fn stop_folds_events_written_before_the_signal() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout(
        "sim1",
        &[
            round_start("twitter", 5, 12),
            action("twitter", 5, 3, "LIKE_POST"),
        ],
    );

    let state = ctx.orchestrator.stop("sim1").await.unwrap();

    assert_eq!(state.runner_status, RunnerStatus::Stopped);
    assert_eq!(state.current_round, 5);
    assert_eq!(state.twitter_actions_count, 1);
}

#[tokio::test]
async fn shutdown_with_kill_stops_every_running_simulation() {
    let ctx = setup();
    ctx.start("a", PlatformMode::Twitter).await;
    ctx.start("b", PlatformMode::Reddit).await;

    ctx.orchestrator.shutdown(true).await;

    assert_eq!(ctx.load("a").unwrap().runner_status, RunnerStatus::Stopped);
    assert_eq!(ctx.load("b").unwrap().runner_status, RunnerStatus::Stopped);
    assert_eq!(ctx.processes.signals(1000), vec![StopSignal::Terminate]);
    assert_eq!(ctx.processes.signals(1001), vec![StopSignal::Terminate]);
    assert!(ctx.orchestrator.active_monitors().is_empty());
}

#[tokio::test]
async fn shutdown_without_kill_leaves_workers_running() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;

    ctx.orchestrator.shutdown(false).await;

    assert!(ctx.orchestrator.active_monitors().is_empty());
    assert!(ctx.processes.signals(1000).is_empty());
    assert_eq!(ctx.load("sim1").unwrap().runner_status, RunnerStatus::Running);
}
