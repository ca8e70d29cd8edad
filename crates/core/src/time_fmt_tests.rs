// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{format_elapsed, format_run_duration};
use chrono::{TimeZone, Utc};

#[yare::parameterized(
    zero_seconds     = { 0,      "0s" },
    max_seconds      = { 59,     "59s" },
    one_minute       = { 60,     "1m" },
    max_minutes      = { 3599,   "59m" },
    one_hour         = { 3600,   "1h" },
    hour_and_minutes = { 3660,   "1h1m" },
    hours_no_minutes = { 7200,   "2h" },
    almost_a_day     = { 86399,  "23h59m" },
    one_day          = { 86400,  "1d" },
    two_days         = { 172800, "2d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[test]
fn run_duration_uses_end_time_when_finished() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 1, 11, 30, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
    assert_eq!(format_run_duration(start, Some(end), now), "1h30m");
}

#[test]
fn run_duration_counts_to_now_while_running() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 2, 5).unwrap();
    assert_eq!(format_run_duration(start, None, now), "2m");
}

#[test]
fn run_duration_clamps_clock_skew() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    assert_eq!(format_run_duration(start, None, earlier), "0s");
}
