// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured simulation events from the worker's action log.
//!
//! The worker writes one flat JSON object per line. Every line carries
//! `timestamp` and `platform`; the remaining fields decide the kind:
//!
//! ```text
//! {"event_type":"simulation_start","total_rounds":24,"agents_count":12,...}
//! {"event_type":"round_start","round":3,"simulated_hour":11,...}
//! {"round":3,"agent_id":7,"agent_name":"ada","action_type":"CREATE_POST",...}
//! {"event_type":"round_end","round":3,"actions_count":9,...}
//! {"event_type":"simulation_end","total_rounds":24,"total_actions":210,...}
//! ```
//!
//! [`SimEvent`] keeps that flat wire shape on (de)serialization and exposes a
//! typed [`EventKind`] to the rest of the crate.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Action-log line that is valid JSON but not a recognizable event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventFormatError {
    #[error("unknown event_type: {0}")]
    UnknownEventType(String),
    #[error("{event} is missing field `{field}`")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
    #[error("line has neither event_type nor action fields")]
    Unrecognized,
}

/// One agent action taken during a round.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    pub round: u32,
    pub agent_id: i64,
    pub agent_name: String,
    pub action_type: String,
    pub action_args: Value,
    pub result: Option<Value>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    SimulationStart {
        total_rounds: Option<u32>,
        agents_count: Option<u64>,
    },
    SimulationEnd {
        total_rounds: Option<u32>,
        total_actions: Option<u64>,
    },
    RoundStart {
        round: u32,
        simulated_hour: Option<u32>,
    },
    RoundEnd {
        round: u32,
        actions_count: Option<u64>,
    },
    Action(AgentAction),
}

/// A decoded action-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct SimEvent {
    pub timestamp: String,
    pub platform: Option<Platform>,
    pub kind: EventKind,
}

impl SimEvent {
    /// Round this event belongs to, if any.
    pub fn round(&self) -> Option<u32> {
        match &self.kind {
            EventKind::RoundStart { round, .. } | EventKind::RoundEnd { round, .. } => Some(*round),
            EventKind::Action(action) => Some(action.round),
            EventKind::SimulationStart { .. } | EventKind::SimulationEnd { .. } => None,
        }
    }

    pub fn as_action(&self) -> Option<&AgentAction> {
        match &self.kind {
            EventKind::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Short name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            EventKind::SimulationStart { .. } => "simulation_start",
            EventKind::SimulationEnd { .. } => "simulation_end",
            EventKind::RoundStart { .. } => "round_start",
            EventKind::RoundEnd { .. } => "round_end",
            EventKind::Action(_) => "action",
        }
    }
}

/// Flat wire shape of an action-log line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawEvent {
    #[serde(default)]
    timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    simulated_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agents_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_actions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_args: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
}

fn require<T>(value: Option<T>, event: &'static str, field: &'static str) -> Result<T, EventFormatError> {
    value.ok_or(EventFormatError::MissingField { event, field })
}

impl TryFrom<RawEvent> for SimEvent {
    type Error = EventFormatError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let kind = match raw.event_type.as_deref() {
            Some("simulation_start") => EventKind::SimulationStart {
                total_rounds: raw.total_rounds,
                agents_count: raw.agents_count,
            },
            Some("simulation_end") => EventKind::SimulationEnd {
                total_rounds: raw.total_rounds,
                total_actions: raw.total_actions,
            },
            Some("round_start") => EventKind::RoundStart {
                round: require(raw.round, "round_start", "round")?,
                simulated_hour: raw.simulated_hour,
            },
            Some("round_end") => EventKind::RoundEnd {
                round: require(raw.round, "round_end", "round")?,
                actions_count: raw.actions_count,
            },
            Some(other) => return Err(EventFormatError::UnknownEventType(other.to_string())),
            None => {
                if raw.action_type.is_none() && raw.agent_id.is_none() {
                    return Err(EventFormatError::Unrecognized);
                }
                EventKind::Action(AgentAction {
                    round: require(raw.round, "action", "round")?,
                    agent_id: require(raw.agent_id, "action", "agent_id")?,
                    agent_name: raw.agent_name.unwrap_or_default(),
                    action_type: require(raw.action_type, "action", "action_type")?,
                    action_args: raw.action_args.unwrap_or(Value::Null),
                    result: raw.result,
                    success: raw.success.unwrap_or(true),
                })
            }
        };

        Ok(SimEvent {
            timestamp: raw.timestamp,
            platform: raw.platform,
            kind,
        })
    }
}

impl From<SimEvent> for RawEvent {
    fn from(event: SimEvent) -> Self {
        let mut raw = RawEvent {
            timestamp: event.timestamp,
            platform: event.platform,
            ..RawEvent::default()
        };
        match event.kind {
            EventKind::SimulationStart {
                total_rounds,
                agents_count,
            } => {
                raw.event_type = Some("simulation_start".to_string());
                raw.total_rounds = total_rounds;
                raw.agents_count = agents_count;
            }
            EventKind::SimulationEnd {
                total_rounds,
                total_actions,
            } => {
                raw.event_type = Some("simulation_end".to_string());
                raw.total_rounds = total_rounds;
                raw.total_actions = total_actions;
            }
            EventKind::RoundStart {
                round,
                simulated_hour,
            } => {
                raw.event_type = Some("round_start".to_string());
                raw.round = Some(round);
                raw.simulated_hour = simulated_hour;
            }
            EventKind::RoundEnd {
                round,
                actions_count,
            } => {
                raw.event_type = Some("round_end".to_string());
                raw.round = Some(round);
                raw.actions_count = actions_count;
            }
            EventKind::Action(action) => {
                raw.round = Some(action.round);
                raw.agent_id = Some(action.agent_id);
                raw.agent_name = Some(action.agent_name);
                raw.action_type = Some(action.action_type);
                raw.action_args = Some(action.action_args);
                raw.result = action.result;
                raw.success = Some(action.success);
            }
        }
        raw
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
