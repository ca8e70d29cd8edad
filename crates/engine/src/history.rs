// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over a run's action log.
//!
//! These work on the events decoded from the current run's portion of the
//! stdout log. Events without a platform tag are attributed to the run's
//! platform when it only runs one.

use serde::Serialize;
use simrun_core::{AgentAction, EventKind, Platform, PlatformMode, SimEvent};
use std::collections::{BTreeMap, HashMap};

/// Which actions to return from [`actions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    pub platform: Option<Platform>,
    pub agent_id: Option<i64>,
    pub round: Option<u32>,
    pub offset: usize,
    /// `None` returns every match past `offset`.
    pub limit: Option<usize>,
}

/// One page of actions, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPage {
    /// Matches before paging
    pub total: usize,
    pub offset: usize,
    pub actions: Vec<SimEvent>,
}

/// Activity within one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub simulated_hour: Option<u32>,
    pub twitter_actions: u64,
    pub reddit_actions: u64,
    pub total_actions: u64,
    /// A `round_end` was seen
    pub ended: bool,
}

/// Totals for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    pub agent_id: i64,
    pub agent_name: String,
    pub total_actions: u64,
    pub twitter_actions: u64,
    pub reddit_actions: u64,
    pub failed_actions: u64,
    pub action_types: BTreeMap<String, u64>,
    pub first_round: u32,
    pub last_round: u32,
}

fn attributed(event: &SimEvent, mode: PlatformMode) -> Option<Platform> {
    event.platform.or_else(|| mode.sole())
}

fn actions_in(events: &[SimEvent]) -> impl DoubleEndedIterator<Item = (&SimEvent, &AgentAction)> {
    events
        .iter()
        .filter_map(|event| event.as_action().map(|action| (event, action)))
}

/// Filtered, paged agent actions, newest first.
pub fn actions(events: &[SimEvent], mode: PlatformMode, filter: &ActionFilter) -> ActionPage {
    let matching: Vec<SimEvent> = actions_in(events)
        .rev()
        .filter(|(event, action)| {
            filter
                .platform
                .is_none_or(|p| attributed(event, mode) == Some(p))
                && filter.agent_id.is_none_or(|id| action.agent_id == id)
                && filter.round.is_none_or(|round| action.round == round)
        })
        .map(|(event, _)| SimEvent {
            platform: attributed(event, mode),
            ..event.clone()
        })
        .collect();

    let total = matching.len();
    let page = matching
        .into_iter()
        .skip(filter.offset)
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect();

    ActionPage {
        total,
        offset: filter.offset,
        actions: page,
    }
}

/// Per-round activity, in round order.
pub fn timeline(events: &[SimEvent], mode: PlatformMode) -> Vec<RoundSummary> {
    let mut rounds: BTreeMap<u32, RoundSummary> = BTreeMap::new();
    for event in events {
        let Some(round) = event.round() else {
            continue;
        };
        let summary = rounds.entry(round).or_insert_with(|| RoundSummary {
            round,
            ..RoundSummary::default()
        });
        match &event.kind {
            EventKind::RoundStart { simulated_hour, .. } => {
                if simulated_hour.is_some() {
                    summary.simulated_hour = *simulated_hour;
                }
            }
            EventKind::RoundEnd { .. } => summary.ended = true,
            EventKind::Action(_) => {
                summary.total_actions += 1;
                match attributed(event, mode) {
                    Some(Platform::Twitter) => summary.twitter_actions += 1,
                    Some(Platform::Reddit) => summary.reddit_actions += 1,
                    None => {}
                }
            }
            _ => {}
        }
    }
    rounds.into_values().collect()
}

/// Per-agent totals, most active first.
pub fn agent_stats(events: &[SimEvent], mode: PlatformMode) -> Vec<AgentStats> {
    let mut agents: HashMap<i64, AgentStats> = HashMap::new();
    for (event, action) in actions_in(events) {
        let stats = agents.entry(action.agent_id).or_insert_with(|| AgentStats {
            agent_id: action.agent_id,
            agent_name: action.agent_name.clone(),
            total_actions: 0,
            twitter_actions: 0,
            reddit_actions: 0,
            failed_actions: 0,
            action_types: BTreeMap::new(),
            first_round: action.round,
            last_round: action.round,
        });
        stats.total_actions += 1;
        match attributed(event, mode) {
            Some(Platform::Twitter) => stats.twitter_actions += 1,
            Some(Platform::Reddit) => stats.reddit_actions += 1,
            None => {}
        }
        if !action.success {
            stats.failed_actions += 1;
        }
        *stats
            .action_types
            .entry(action.action_type.clone())
            .or_default() += 1;
        stats.first_round = stats.first_round.min(action.round);
        stats.last_round = stats.last_round.max(action.round);
        if stats.agent_name.is_empty() {
            stats.agent_name = action.agent_name.clone();
        }
    }

    let mut stats: Vec<_> = agents.into_values().collect();
    stats.sort_by(|a, b| {
        b.total_actions
            .cmp(&a.total_actions)
            .then(a.agent_id.cmp(&b.agent_id))
    });
    stats
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
