//! Action history specs
//!
//! Query actions, timeline, and agent stats of a finished run.

use crate::prelude::*;

fn finished() -> Sandbox {
    let sandbox = Sandbox::with_worker(TWO_ROUND_WORKER);
    sandbox
        .start("sim1", &["--platform", "twitter", "--follow"])
        .passes();
    sandbox
}

#[test]
fn actions_newest_first() {
    let sandbox = finished();
    let out = sandbox.simrun().args(&["actions", "sim1"]).passes();
    let stdout = out.stdout();
    let lines: Vec<&str> = stdout.lines().collect();

    assert!(lines[0].starts_with("ROUND  PLATFORM"), "{stdout}");
    assert!(lines[1].contains("ada (1)") && lines[1].contains("again"), "{stdout}");
    assert!(lines[2].contains("bob (2)") && lines[2].contains("failed"), "{stdout}");
    assert_eq!(lines.last(), Some(&"Showing 1-3 of 3 actions"));
}

#[test]
fn actions_filter_by_agent_as_json() {
    let sandbox = finished();
    let page = sandbox
        .simrun()
        .args(&["actions", "sim1", "--agent", "1", "-o", "json"])
        .passes()
        .json();

    assert_eq!(page["total"], 2);
    let actions = page["actions"].as_array().unwrap();
    assert!(actions.iter().all(|a| a["agent_id"] == 1));
    assert!(actions.iter().all(|a| a["platform"] == "twitter"));
}

#[test]
fn actions_paging() {
    let sandbox = finished();
    sandbox
        .simrun()
        .args(&["actions", "sim1", "-n", "1", "--offset", "1"])
        .passes()
        .stdout_has("LIKE_POST")
        .stdout_has("Showing 2-2 of 3 actions");
}

#[test]
fn timeline_shows_each_round() {
    let sandbox = finished();
    sandbox
        .simrun()
        .args(&["timeline", "sim1"])
        .passes()
        .stdout_eq(
            "ROUND   HOUR  TWITTER  REDDIT  TOTAL  STATE\n\
             \x20   1  08:00        2       0      2  ended\n\
             \x20   2  09:00        1       0      1  ended\n",
        );
}

#[test]
fn stats_rank_agents_by_activity() {
    let sandbox = finished();
    let agents = sandbox
        .simrun()
        .args(&["stats", "sim1", "-o", "json"])
        .passes()
        .json();

    assert_eq!(agents[0]["agent_name"], "ada");
    assert_eq!(agents[0]["total_actions"], 2);
    assert_eq!(agents[1]["agent_name"], "bob");
    assert_eq!(agents[1]["failed_actions"], 1);
}
