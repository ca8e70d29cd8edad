// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reader for the simulation configuration file.
//!
//! The file is produced and validated upstream. Only `time_config` matters
//! here (to size the run); the rest is carried through for display.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read simulation config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid simulation config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("minutes_per_round must be greater than zero")]
    ZeroMinutesPerRound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    pub total_simulation_hours: u32,
    pub minutes_per_round: u32,
    #[serde(default)]
    pub agents_per_hour_min: u32,
    #[serde(default)]
    pub agents_per_hour_max: u32,
    #[serde(default)]
    pub peak_hours: Vec<u32>,
    #[serde(default)]
    pub off_peak_hours: Vec<u32>,
    #[serde(default)]
    pub peak_activity_multiplier: f64,
    #[serde(default)]
    pub off_peak_activity_multiplier: f64,
}

impl TimeConfig {
    /// `total_simulation_hours * 60 / minutes_per_round`, truncated.
    pub fn total_rounds(&self) -> Result<u32, ConfigError> {
        if self.minutes_per_round == 0 {
            return Err(ConfigError::ZeroMinutesPerRound);
        }
        let total_minutes = u64::from(self.total_simulation_hours) * 60;
        let rounds = total_minutes / u64::from(self.minutes_per_round);
        Ok(u32::try_from(rounds).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    pub initial_posts: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub simulation_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    pub time_config: TimeConfig,
    #[serde(default)]
    pub agent_configs: Vec<Value>,
    #[serde(default)]
    pub event_config: EventConfig,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub llm_base_url: Option<String>,
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn total_rounds(&self) -> Result<u32, ConfigError> {
        self.time_config.total_rounds()
    }

    pub fn agents_count(&self) -> usize {
        self.agent_configs.len()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
