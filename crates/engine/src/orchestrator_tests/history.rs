// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ActionFilter;

#[tokio::test]
async fn actions_come_from_the_current_run_only() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout("sim1", &[action("twitter", 1, 1, "CREATE_POST")]);
    ctx.processes.set_exited(1000, 0);
    ctx.wait_for("sim1", |s| s.runner_status.is_terminal()).await;

    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout(
        "sim1",
        &[
            action("twitter", 1, 2, "LIKE_POST"),
            action("twitter", 2, 3, "REPOST"),
        ],
    );

    let page = ctx
        .orchestrator
        .actions("sim1", &ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let agents: Vec<i64> = page
        .actions
        .iter()
        .filter_map(|e| e.as_action().map(|a| a.agent_id))
        .collect();
    assert_eq!(agents, vec![3, 2]);
}

#[tokio::test]
async fn actions_filter_by_platform_and_page() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Parallel).await;
    ctx.append_stdout(
        "sim1",
        &[
            action("twitter", 1, 1, "CREATE_POST"),
            action("reddit", 1, 2, "CREATE_COMMENT"),
            action("reddit", 2, 3, "UPVOTE"),
        ],
    );

    let page = ctx
        .orchestrator
        .actions(
            "sim1",
            &ActionFilter {
                platform: Some(simrun_core::Platform::Reddit),
                limit: Some(1),
                ..ActionFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.actions.len(), 1);
    assert_eq!(page.actions[0].as_action().unwrap().agent_id, 3);
}

#[tokio::test]
async fn timeline_and_agent_stats_summarize_the_log() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;
    ctx.append_stdout(
        "sim1",
        &[
            round_start("twitter", 1, 8),
            action("twitter", 1, 1, "CREATE_POST"),
            action("twitter", 1, 1, "LIKE_POST"),
            round_start("twitter", 2, 9),
            action("twitter", 2, 2, "CREATE_POST"),
            simulation_end("twitter"),
        ],
    );

    let timeline = ctx.orchestrator.timeline("sim1").await.unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].round, 1);
    assert_eq!(timeline[0].twitter_actions, 2);
    assert_eq!(timeline[1].simulated_hour, Some(9));

    let stats = ctx.orchestrator.agent_stats("sim1").await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].agent_id, 1);
    assert_eq!(stats[0].total_actions, 2);
    assert_eq!(stats[0].action_types.get("LIKE_POST"), Some(&1));
}

#[tokio::test]
async fn history_of_a_run_without_output_is_empty() {
    let ctx = setup();
    ctx.start("sim1", PlatformMode::Twitter).await;

    let page = ctx
        .orchestrator
        .actions("sim1", &ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(ctx.orchestrator.timeline("sim1").await.unwrap().is_empty());
    assert!(ctx.orchestrator.agent_stats("sim1").await.unwrap().is_empty());
}

#[tokio::test]
async fn history_of_unknown_simulation_is_not_found() {
    let ctx = setup();
    let err = ctx.orchestrator.timeline("ghost").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound(_)), "{err}");
}
