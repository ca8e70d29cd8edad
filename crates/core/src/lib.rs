// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! simrun-core: shared types for the simulation run orchestrator

pub mod clock;
pub mod config;
pub mod event;
pub mod id;
pub mod platform;
pub mod run_state;
pub mod time_fmt;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, EventConfig, SimulationConfig, TimeConfig};
pub use event::{AgentAction, EventFormatError, EventKind, SimEvent};
pub use id::{IdError, IdGen, RunId, SequentialIdGen, SimulationId, UuidIdGen};
pub use platform::{Platform, PlatformMode, UnknownPlatform};
pub use run_state::{LogCursor, RunState, RunStateConfig, RunnerStatus};
pub use time_fmt::{format_elapsed, format_run_duration};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
