// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use simrun_core::PlatformMode;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

fn running(id: &str, mode: PlatformMode) -> RunState {
    let mut state = RunState::running_for_test(id, mode, 4242);
    state.started_at = at(0);
    state.updated_at = at(0);
    state
}

fn lines(table: &Table) -> Vec<String> {
    let mut buf = Vec::new();
    table.render(&mut buf);
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn render_state_for_running_simulation() {
    let mut state = running("sim1", PlatformMode::Parallel);
    state.current_round = 5;
    state.simulated_hours = 13;
    state.twitter_actions_count = 40;
    state.reddit_actions_count = 2;
    state.reddit_completed = true;

    let text = render_state(&state, at(150));
    assert_eq!(
        text,
        "Simulation: sim1\n\
         \x20 Status:   running\n\
         \x20 Run:      sim1-run\n\
         \x20 Platform: parallel (twitter running, reddit done)\n\
         \x20 Pid:      4242\n\
         \x20 Round:    5/24 (hour 13:00)\n\
         \x20 Actions:  42 (twitter 40, reddit 2)\n\
         \x20 Started:  2026-01-01 12:00:00 UTC (2m ago)\n\
         \x20 Duration: 2m\n\
         \x20 Config:   /sims/sim1/simulation_config.json\n"
    );
}

#[test]
fn render_state_for_failed_simulation_indents_error() {
    let mut state = running("sim1", PlatformMode::Twitter);
    state.mark_failed("worker exited with code 1\nValueError: bad", at(30));

    let text = render_state(&state, at(3600));
    assert!(!text.contains("Pid:"));
    assert!(text.contains("  Status:   failed\n"));
    assert!(text.contains("  Platform: twitter (twitter idle)\n"));
    // Duration stops at the end time
    assert!(text.contains("  Duration: 30s\n"));
    assert!(text.ends_with("  Error:\n    worker exited with code 1\n    ValueError: bad\n"));
}

#[test]
fn list_table_shows_one_row_per_run() {
    let mut first = running("sim_a", PlatformMode::Twitter);
    first.current_round = 3;
    first.twitter_actions_count = 12;

    let mut second = running("election_2026", PlatformMode::Reddit);
    second.total_rounds = 0;
    second.mark_stopped(at(90));

    let mut table = Table::with_color(list_columns(), false);
    fill_list(&mut table, &[first, second], at(120));

    assert_eq!(
        lines(&table),
        [
            "SIMULATION     STATUS   PLATFORM  ROUND  ACTIONS   PID  STARTED  DURATION",
            "sim_a          running  twitter    3/24       12  4242  2m             2m",
            "election_2026  stopped  reddit      0/?        0     -  2m             1m",
        ]
    );
}
