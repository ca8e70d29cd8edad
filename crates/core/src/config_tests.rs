// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn time(hours: u32, minutes_per_round: u32) -> TimeConfig {
    TimeConfig {
        total_simulation_hours: hours,
        minutes_per_round,
        agents_per_hour_min: 5,
        agents_per_hour_max: 20,
        peak_hours: vec![19, 20, 21],
        off_peak_hours: vec![2, 3, 4],
        peak_activity_multiplier: 1.5,
        off_peak_activity_multiplier: 0.3,
    }
}

#[yare::parameterized(
    one_day_hourly       = { 24, 60, 24 },
    three_days_half_hour = { 72, 30, 144 },
    truncates            = { 1,  45, 1 },
    zero_hours           = { 0,  60, 0 },
)]
fn total_rounds(hours: u32, minutes: u32, expected: u32) {
    assert_eq!(time(hours, minutes).total_rounds().unwrap(), expected);
}

#[test]
fn zero_minutes_per_round_is_an_error() {
    assert!(matches!(
        time(24, 0).total_rounds(),
        Err(ConfigError::ZeroMinutesPerRound)
    ));
}

#[test]
fn load_reads_full_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulation_config.json");
    std::fs::write(
        &path,
        r#"{
            "simulation_id": "sim1",
            "platform": "twitter",
            "time_config": {
                "total_simulation_hours": 72,
                "minutes_per_round": 30,
                "agents_per_hour_min": 5,
                "agents_per_hour_max": 20,
                "peak_hours": [19, 20, 21, 22],
                "off_peak_hours": [0, 1, 2, 3, 4, 5],
                "peak_activity_multiplier": 1.5,
                "off_peak_activity_multiplier": 0.05
            },
            "agent_configs": [{"agent_id": 0}, {"agent_id": 1}],
            "event_config": {"initial_posts": [{"content": "hello"}]},
            "llm_model": "gpt-4o-mini",
            "llm_base_url": "http://localhost:8000/v1",
            "generated_reasoning": "ignored by the runner"
        }"#,
    )
    .unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    assert_eq!(config.simulation_id.as_deref(), Some("sim1"));
    assert_eq!(config.total_rounds().unwrap(), 144);
    assert_eq!(config.agents_count(), 2);
    assert_eq!(config.event_config.initial_posts.len(), 1);
    assert_eq!(config.time_config.peak_hours, vec![19, 20, 21, 22]);
}

#[test]
fn load_tolerates_minimal_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.json");
    std::fs::write(
        &path,
        r#"{"time_config": {"total_simulation_hours": 24, "minutes_per_round": 60}}"#,
    )
    .unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    assert_eq!(config.total_rounds().unwrap(), 24);
    assert!(config.agent_configs.is_empty());
    assert_eq!(config.llm_model, None);
}

#[test]
fn load_missing_file_reports_path() {
    let err = SimulationConfig::load(Path::new("/nonexistent/simulation_config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/simulation_config.json"));
}

#[test]
fn load_rejects_config_without_time_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.json");
    std::fs::write(&path, r#"{"simulation_id": "sim1"}"#).unwrap();

    let err = SimulationConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }));
}
