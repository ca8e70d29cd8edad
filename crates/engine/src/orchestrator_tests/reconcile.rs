// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::deps;

#[tokio::test]
async fn reconcile_reattaches_live_workers() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.orchestrator.shutdown(false).await;

    let restarted = ctx.reopen(&ctx.processes);
    let summary = restarted.reconcile().await.unwrap();

    assert_eq!(
        summary,
        ReconcileSummary {
            reattached: 1,
            finalized: 0
        }
    );
    assert_eq!(restarted.active_monitors(), vec![SimulationId::new("sim1")]);

    ctx.processes.set_exited(1000, 0);
    let state = ctx.wait_for("sim1", |s| s.runner_status.is_terminal()).await;
    assert_eq!(state.runner_status, RunnerStatus::Completed);
}

#[tokio::test]
async fn reconcile_finalizes_workers_that_died_meanwhile() {
    let ctx = setup();
    ctx.start("crashed", PlatformMode::Twitter).await;
    ctx.start("finished", PlatformMode::Twitter).await;
    ctx.orchestrator.shutdown(false).await;
    ctx.processes.set_exited(1000, 1);
    ctx.processes.set_exited(1001, 0);

    let restarted = ctx.reopen(&ctx.processes);
    let summary = restarted.reconcile().await.unwrap();

    assert_eq!(summary.finalized, 2);
    assert_eq!(summary.reattached, 0);
    assert!(restarted.active_monitors().is_empty());
    assert_eq!(ctx.load("crashed").unwrap().runner_status, RunnerStatus::Failed);
    assert_eq!(ctx.load("finished").unwrap().runner_status, RunnerStatus::Completed);
}

#[tokio::test]
async fn reattached_monitor_resumes_from_the_saved_offset() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout("sim1", &[action("twitter", 1, 1, "CREATE_POST")]);
    ctx.wait_for("sim1", |s| s.twitter_actions_count == 1).await;
    ctx.orchestrator.shutdown(false).await;

    // Written while no runner was watching
    ctx.append_stdout("sim1", &[action("twitter", 2, 2, "CREATE_POST")]);

    let restarted = ctx.reopen(&ctx.processes);
    restarted.reconcile().await.unwrap();
    let state = ctx.wait_for("sim1", |s| s.current_round == 2).await;
    assert_eq!(state.twitter_actions_count, 2);
}

#[tokio::test]
async fn open_reconciles_before_returning() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.orchestrator.shutdown(false).await;

    // A fresh adapter knows nothing of pid 1000: the worker is gone
    let processes = simrun_adapters::FakeProcessAdapter::new();
    let reopened = Orchestrator::open(
        ctx.orchestrator.config().clone(),
        deps(&processes, &ctx.clock),
    )
    .await
    .unwrap();

    assert!(reopened.active_monitors().is_empty());
    let state = ctx.load("sim1").unwrap();
    assert_eq!(state.runner_status, RunnerStatus::Failed);
    assert_eq!(state.last_error.as_deref(), Some("worker process disappeared"));
}

#[tokio::test]
async fn reconcile_ignores_terminal_records() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.orchestrator.stop("sim1").await.unwrap();

    let restarted = ctx.reopen(&ctx.processes);
    assert_eq!(
        restarted.reconcile().await.unwrap(),
        ReconcileSummary::default()
    );
}

#[tokio::test]
async fn purge_removes_a_finished_simulation() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout("sim1", &[simulation_end("twitter")]);
    ctx.orchestrator.stop("sim1").await.unwrap();

    let purged = ctx.orchestrator.purge("sim1").await.unwrap();

    assert_eq!(purged.runner_status, RunnerStatus::Stopped);
    assert!(!ctx.sim_dir("sim1").exists());
    assert_eq!(ctx.orchestrator.status("sim1").await.unwrap(), None);
    assert!(ctx
        .orchestrator
        .recent_events(&SimulationId::new("sim1"), 10)
        .is_empty());
}

#[tokio::test]
async fn purge_refuses_a_running_simulation() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;

    let err = ctx.orchestrator.purge("sim1").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::StillRunning(_)), "{err}");
    assert!(ctx.load("sim1").is_some());
}

#[tokio::test]
async fn purge_unknown_simulation_is_not_found() {
    let ctx = setup();
    let err = ctx.orchestrator.purge("ghost").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound(_)), "{err}");
}
