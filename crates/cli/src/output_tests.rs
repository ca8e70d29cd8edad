// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use simrun_core::PlatformMode;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_767_225_600 + secs, 0).unwrap()
}

#[yare::parameterized(
    seconds = { 42,     "42s" },
    minutes = { 150,    "2m" },
    hours   = { 5400,   "1h30m" },
    days    = { 200000, "2d" },
)]
fn time_ago(elapsed: i64, expected: &str) {
    assert_eq!(format_time_ago(at(0), at(elapsed)), expected);
}

#[test]
fn time_ago_in_the_future_reads_as_zero() {
    assert_eq!(format_time_ago(at(10), at(0)), "0s");
}

#[test]
fn progress_shows_unknown_total() {
    let mut state = RunState::running_for_test("sim1", PlatformMode::Twitter, 1);
    state.current_round = 3;
    assert_eq!(format_progress(&state), "3/24");

    state.total_rounds = 0;
    assert_eq!(format_progress(&state), "3/?");
}

#[yare::parameterized(
    morning  = { Some(8),  "08:00" },
    evening  = { Some(21), "21:00" },
    wraps    = { Some(30), "06:00" },
    unknown  = { None,     "-" },
)]
fn hour(hour: Option<u32>, expected: &str) {
    assert_eq!(format_hour(hour), expected);
}

#[test]
fn progress_line_summarizes_counts() {
    let mut state = RunState::running_for_test("sim1", PlatformMode::Parallel, 1);
    state.current_round = 5;
    state.simulated_hours = 13;
    state.twitter_actions_count = 40;
    state.reddit_actions_count = 2;

    assert_eq!(
        progress_line(&state),
        "sim1  running  round 5/24  hour 13:00  actions 42 (twitter 40, reddit 2)"
    );
}
