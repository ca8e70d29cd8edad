//! CLI error handling specs
//!
//! Verify error messages for bad ids, missing configs, and unknown runs.

use crate::prelude::*;

#[test]
fn status_of_unknown_simulation() {
    let sandbox = Sandbox::new();
    sandbox
        .simrun()
        .args(&["status", "ghost"])
        .passes()
        .stdout_eq("Simulation ghost has never been started\n");
}

#[test]
fn status_of_unknown_simulation_as_json_is_null() {
    let sandbox = Sandbox::new();
    let out = sandbox
        .simrun()
        .args(&["status", "ghost", "-o", "json"])
        .passes();
    assert!(out.json().is_null());
}

#[test]
fn stop_unknown_simulation_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .simrun()
        .args(&["stop", "ghost"])
        .fails()
        .stderr_has("simulation not found: ghost");
}

#[test]
fn start_rejects_path_like_id() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox
        .start("../escape", &[])
        .fails()
        .stderr_has("is not a valid directory name");
}

#[test]
fn start_with_missing_config_fails() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox
        .simrun()
        .args(&["start", "sim1", "--config", "nope.json"])
        .fails()
        .stderr_has("simulation config not found: nope.json");
    sandbox
        .simrun()
        .args(&["status", "sim1"])
        .passes()
        .stdout_has("never been started");
}

#[test]
fn start_with_invalid_config_fails() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox.file("simulation_config.json", r#"{"simulation_id": "sim1"}"#);
    sandbox
        .start("sim1", &[])
        .fails()
        .stderr_has("invalid simulation config");
}

#[test]
fn start_with_unknown_platform_fails() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox
        .start("sim1", &["--platform", "mastodon"])
        .fails()
        .stderr_has("unknown platform \"mastodon\"");
}

#[test]
fn start_with_missing_worker_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .start("sim1", &[])
        .fails()
        .stderr_has("failed to spawn worker");
}

#[test]
fn actions_of_unknown_simulation_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .simrun()
        .args(&["actions", "ghost"])
        .fails()
        .stderr_has("simulation not found: ghost");
}
