// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! simrun-engine: launches simulation workers, watches them, and keeps
//! their run state current.

pub mod bridge;
pub mod config;
pub mod decoder;
pub mod env;
mod error;
pub mod history;
pub mod log_paths;
mod monitor;
mod orchestrator;
mod registry;
pub mod tail;

#[cfg(test)]
mod test_helpers;

pub use bridge::ActionBridge;
pub use config::{RunnerConfig, RunnerConfigError, WorkerCommand};
pub use decoder::{JsonLineDecoder, LineDecoder};
pub use error::OrchestratorError;
pub use history::{ActionFilter, ActionPage, AgentStats, RoundSummary};
pub use monitor::STDERR_TAIL_LINES;
pub use orchestrator::{Orchestrator, OrchestratorDeps, ReconcileSummary, StopOutcome};
