// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator tests

mod history;
mod real_process;
mod reconcile;
mod start;
mod status;
mod stop;

use super::*;
use crate::test_helpers::{action, round_start, setup, setup_with, simulation_end, TestContext};
use simrun_core::RunnerStatus;
