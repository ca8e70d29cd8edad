// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::WorkerCommand;

#[tokio::test]
async fn start_launches_worker_and_persists_running_state() {
    let ctx = setup();
    let state = ctx.start("sim1", PlatformMode::Twitter).await;

    assert_eq!(state.runner_status, RunnerStatus::Running);
    assert_eq!(state.process_pid, Some(1000));
    assert_eq!(state.run_id, RunId::new("run-1"));
    assert_eq!(state.total_rounds, 24);
    assert_eq!(state.current_round, 0);
    assert!(state.twitter_running);
    assert!(!state.reddit_running);
    assert_eq!(state.config_path, ctx.config_path.canonicalize().unwrap());
    assert_eq!(ctx.load("sim1"), Some(state.clone()));

    let launches = ctx.processes.launches();
    assert_eq!(launches.len(), 1);
    let spec = &launches[0];
    assert_eq!(spec.simulation_id, SimulationId::new("sim1"));
    assert_eq!(spec.platform, PlatformMode::Twitter);
    assert_eq!(spec.program, "simrun-worker");
    assert_eq!(spec.cwd, ctx.sim_dir("sim1"));
    assert_eq!(spec.stdout_log, ctx.sim_dir("sim1").join("stdout.log"));
    assert_eq!(spec.stderr_log, ctx.sim_dir("sim1").join("stderr.log"));
    assert_eq!(spec.config_path, state.config_path);
}

#[tokio::test]
async fn start_uses_configured_worker_command() {
    let ctx = setup_with(|config| {
        config.with_worker(WorkerCommand::new("python3").args(["-m", "simworker"]))
    });
    ctx.start("sim1", PlatformMode::Parallel).await;

    let spec = ctx.processes.spec(1000).unwrap();
    assert_eq!(spec.program, "python3");
    assert_eq!(spec.args, vec!["-m", "simworker"]);
    assert_eq!(spec.platform, PlatformMode::Parallel);
}

#[tokio::test]
async fn start_rejects_unsafe_ids() {
    let ctx = setup();
    for id in ["", "../etc", "a/b", "..", "my sim"] {
        let err = ctx
            .orchestrator
            .start(id, PlatformMode::Twitter, &ctx.config_path)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidRequest(_)), "{id:?}: {err}");
    }
    assert!(ctx.processes.launches().is_empty());
}

#[tokio::test]
async fn start_without_config_file_launches_nothing() {
    let ctx = setup();
    let missing = ctx.dir.path().join("nope.json");
    let err = ctx
        .orchestrator
        .start("sim1", PlatformMode::Twitter, &missing)
        .await
        .unwrap_err();

    assert!(
        matches!(err, OrchestratorError::Launch(LaunchError::ConfigMissing(ref p)) if *p == missing),
        "{err}"
    );
    assert!(ctx.processes.launches().is_empty());
    assert_eq!(ctx.load("sim1"), None);
}

#[tokio::test]
async fn start_with_unreadable_config_is_a_config_error() {
    let ctx = setup();
    std::fs::write(&ctx.config_path, "not json").unwrap();
    let err = ctx
        .orchestrator
        .start("sim1", PlatformMode::Twitter, &ctx.config_path)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::Config(_)), "{err}");
    assert!(ctx.processes.launches().is_empty());
}

#[tokio::test]
async fn start_while_running_is_rejected() {
    let ctx = setup();
    let first = ctx.start("sim1", PlatformMode::Twitter).await;

    let err = ctx
        .orchestrator
        .start("sim1", PlatformMode::Reddit, &ctx.config_path)
        .await
        .unwrap_err();

    assert!(
        matches!(err, OrchestratorError::AlreadyRunning { pid: 1000, .. }),
        "{err}"
    );
    assert_eq!(ctx.processes.launches().len(), 1);
    assert_eq!(ctx.load("sim1"), Some(first));
}

#[tokio::test]
async fn start_is_rejected_when_liveness_is_unknown() {
    let ctx = setup();
    let stale = RunState::running_for_test("sim1", PlatformMode::Twitter, 555);
    ctx.orchestrator.store().save(&stale).unwrap();
    ctx.processes.fail_next_probes(1);

    let err = ctx
        .orchestrator
        .start("sim1", PlatformMode::Twitter, &ctx.config_path)
        .await
        .unwrap_err();
    assert!(
        matches!(err, OrchestratorError::AlreadyRunning { pid: 555, .. }),
        "{err}"
    );
    assert!(ctx.processes.launches().is_empty());
}

#[tokio::test]
async fn start_replaces_running_record_whose_worker_is_gone() {
    let ctx = setup();
    let stale = RunState::running_for_test("sim1", PlatformMode::Twitter, 555);
    ctx.orchestrator.store().save(&stale).unwrap();

    let state = ctx.start("sim1", PlatformMode::Reddit).await;
    assert_eq!(state.process_pid, Some(1000));
    assert_eq!(state.platform, PlatformMode::Reddit);
    assert_ne!(state.run_id, stale.run_id);
}

#[tokio::test]
async fn failed_launch_leaves_no_record() {
    let ctx = setup();
    ctx.processes.fail_next_launch("exec format error");

    let err = ctx
        .orchestrator
        .start("sim1", PlatformMode::Twitter, &ctx.config_path)
        .await
        .unwrap_err();

    assert!(
        matches!(err, OrchestratorError::Launch(LaunchError::Spawn { .. })),
        "{err}"
    );
    assert_eq!(ctx.load("sim1"), None);
    assert!(ctx.orchestrator.active_monitors().is_empty());
}

#[tokio::test]
async fn start_records_where_this_runs_logs_begin() {
    let ctx = setup();
    ctx.append_stdout_raw("sim1", "old line\n");
    ctx.append_stderr("sim1", "old error\n");

    let state = ctx.start("sim1", PlatformMode::Twitter).await;
    assert_eq!(state.log_cursor.start, 9);
    assert_eq!(state.log_cursor.offset, 9);
    assert_eq!(state.log_cursor.stderr_start, 10);
}

#[tokio::test]
async fn restart_after_completion_begins_a_new_run() {
    let ctx = setup();
    let first = ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout("sim1", &[action("twitter", 1, 1, "CREATE_POST")]);
    ctx.processes.set_exited(1000, 0);
    let done = ctx.wait_for("sim1", |s| s.runner_status.is_terminal()).await;
    assert_eq!(done.twitter_actions_count, 1);

    let second = ctx.start("sim1", PlatformMode::Twitter).await;
    assert_eq!(second.run_id, RunId::new("run-2"));
    assert_eq!(second.process_pid, Some(1001));
    assert_eq!(second.twitter_actions_count, 0);
    assert!(second.log_cursor.start > first.log_cursor.start);
    assert_eq!(second.ended_at, None);
    assert_eq!(second.last_error, None);
}
