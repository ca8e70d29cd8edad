// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `simrun actions`, `simrun timeline`, and `simrun stats`

use anyhow::Result;
use clap::Args;
use simrun_adapters::ProcessAdapter;
use simrun_core::{Clock, Platform};
use simrun_engine::{ActionFilter, ActionPage, AgentStats, Orchestrator, RoundSummary};

use crate::color;
use crate::output::{format_hour, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ActionsArgs {
    /// Simulation id
    pub id: String,

    /// Only actions on this platform (twitter or reddit)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Only actions by this agent id
    #[arg(long)]
    pub agent: Option<i64>,

    /// Only actions in this round
    #[arg(long)]
    pub round: Option<u32>,

    /// Maximum actions to show
    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: usize,

    /// Skip this many of the newest matching actions
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

impl ActionsArgs {
    fn filter(&self) -> ActionFilter {
        ActionFilter {
            platform: self.platform,
            agent_id: self.agent,
            round: self.round,
            offset: self.offset,
            limit: Some(self.limit),
        }
    }
}

pub async fn actions<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    args: ActionsArgs,
    format: OutputFormat,
) -> Result<()> {
    let page = orchestrator.actions(&args.id, &args.filter()).await?;
    match format {
        OutputFormat::Json => print_json(&page)?,
        OutputFormat::Text => {
            if page.actions.is_empty() {
                println!("No actions");
            } else {
                let mut table = Table::new(action_columns());
                fill_actions(&mut table, &page);
                table.render(&mut std::io::stdout());
            }
            if let Some(footer) = page_footer(&page) {
                println!("{}", color::muted(&footer));
            }
        }
    }
    Ok(())
}

pub async fn timeline<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let rounds = orchestrator.timeline(id).await?;
    match format {
        OutputFormat::Json => print_json(&rounds)?,
        OutputFormat::Text if rounds.is_empty() => println!("No rounds yet"),
        OutputFormat::Text => {
            let mut table = Table::new(timeline_columns());
            fill_timeline(&mut table, &rounds);
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

pub async fn stats<P: ProcessAdapter, C: Clock>(
    orchestrator: &Orchestrator<P, C>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let agents = orchestrator.agent_stats(id).await?;
    match format {
        OutputFormat::Json => print_json(&agents)?,
        OutputFormat::Text if agents.is_empty() => println!("No agent activity yet"),
        OutputFormat::Text => {
            let mut table = Table::new(stats_columns());
            fill_stats(&mut table, &agents);
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

pub fn action_columns() -> Vec<Column> {
    vec![
        Column::right("ROUND"),
        Column::left("PLATFORM"),
        Column::left("AGENT").with_max(24),
        Column::left("ACTION"),
        Column::status("RESULT"),
        Column::muted("ARGS").with_max(60),
    ]
}

pub fn fill_actions(table: &mut Table, page: &ActionPage) {
    for event in &page.actions {
        let Some(action) = event.as_action() else {
            continue;
        };
        let args = match &action.action_args {
            serde_json::Value::Null => "-".to_string(),
            value => value.to_string(),
        };
        table.row(vec![
            action.round.to_string(),
            event
                .platform
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            format!("{} ({})", action.agent_name, action.agent_id),
            action.action_type.clone(),
            if action.success { "completed" } else { "failed" }.to_string(),
            args,
        ]);
    }
}

/// "Showing 1-50 of 210 actions"; `None` when nothing matched.
pub fn page_footer(page: &ActionPage) -> Option<String> {
    if page.total == 0 || page.actions.is_empty() {
        return None;
    }
    let first = page.offset + 1;
    let last = page.offset + page.actions.len();
    Some(format!(
        "Showing {first}-{last} of {} actions",
        page.total
    ))
}

pub fn timeline_columns() -> Vec<Column> {
    vec![
        Column::right("ROUND"),
        Column::right("HOUR"),
        Column::right("TWITTER"),
        Column::right("REDDIT"),
        Column::right("TOTAL"),
        Column::muted("STATE"),
    ]
}

pub fn fill_timeline(table: &mut Table, rounds: &[RoundSummary]) {
    for round in rounds {
        table.row(vec![
            round.round.to_string(),
            format_hour(round.simulated_hour),
            round.twitter_actions.to_string(),
            round.reddit_actions.to_string(),
            round.total_actions.to_string(),
            if round.ended { "ended" } else { "open" }.to_string(),
        ]);
    }
}

pub fn stats_columns() -> Vec<Column> {
    vec![
        Column::right("AGENT"),
        Column::left("NAME").with_max(24),
        Column::right("TOTAL"),
        Column::right("TWITTER"),
        Column::right("REDDIT"),
        Column::right("FAILED"),
        Column::right("ROUNDS"),
        Column::left("TOP ACTION"),
    ]
}

pub fn fill_stats(table: &mut Table, agents: &[AgentStats]) {
    for agent in agents {
        table.row(vec![
            agent.agent_id.to_string(),
            agent.agent_name.clone(),
            agent.total_actions.to_string(),
            agent.twitter_actions.to_string(),
            agent.reddit_actions.to_string(),
            agent.failed_actions.to_string(),
            format!("{}-{}", agent.first_round, agent.last_round),
            top_action(agent),
        ]);
    }
}

/// Most frequent action type; ties go to the alphabetically first.
fn top_action(agent: &AgentStats) -> String {
    agent
        .action_types
        .iter()
        .fold(None::<(&String, u64)>, |best, (name, count)| match best {
            Some((_, top)) if top >= *count => best,
            _ => Some((name, *count)),
        })
        .map_or_else(|| "-".to_string(), |(name, count)| format!("{name} ({count})"))
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
