//! Run lifecycle specs
//!
//! Start, follow, stop, and purge against real worker processes.

use crate::prelude::*;

#[test]
fn follow_reports_completion() {
    let sandbox = Sandbox::with_worker(TWO_ROUND_WORKER);
    sandbox
        .start("sim1", &["--platform", "twitter", "--follow"])
        .passes()
        .stdout_has("Following simulation sim1 (2 rounds)")
        .stdout_has("Simulation sim1 completed after 3 actions");

    sandbox
        .simrun()
        .args(&["status", "sim1"])
        .passes()
        .stdout_has("  Status:   completed\n")
        .stdout_has("  Round:    2/2 (hour 09:00)\n")
        .stdout_has("  Actions:  3 (twitter 3, reddit 0)\n")
        .stdout_lacks("Pid:");
}

#[test]
fn follow_fails_when_worker_crashes() {
    let sandbox = Sandbox::with_worker(CRASHING_WORKER);
    sandbox
        .start("sim1", &["--platform", "reddit", "--follow"])
        .fails()
        .stdout_has("Simulation sim1 failed: RuntimeError: model endpoint unreachable")
        .stderr_has("simulation sim1 failed");

    sandbox
        .simrun()
        .args(&["status", "sim1"])
        .passes()
        .stdout_has("  Status:   failed\n")
        .stdout_has("worker exited with code 3")
        .stdout_has("    RuntimeError: model endpoint unreachable\n");
}

#[test]
fn start_returns_while_worker_keeps_running() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox
        .start("sim1", &["--platform", "reddit"])
        .passes()
        .stdout_has("Started simulation sim1 (reddit, pid ");

    // A later invocation still sees the worker alive
    assert_eq!(sandbox.runner_status("sim1"), "running");

    sandbox
        .start("sim1", &[])
        .fails()
        .stderr_has("simulation sim1 is already running");
}

#[test]
fn stop_terminates_a_worker_started_earlier() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox.start("sim1", &[]).passes();

    sandbox
        .simrun()
        .args(&["stop", "sim1"])
        .passes()
        .stdout_eq("Stopped simulation sim1\n");
    assert_eq!(sandbox.runner_status("sim1"), "stopped");

    // Stopping again is a no-op
    sandbox
        .simrun()
        .args(&["stop", "sim1"])
        .passes()
        .stdout_has("already stopped");
}

#[test]
fn restart_after_stop_gets_a_new_run() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    let first = sandbox.start("sim1", &["-o", "json"]).passes().json();
    sandbox.simrun().args(&["stop", "sim1"]).passes();
    let second = sandbox.start("sim1", &["-o", "json"]).passes().json();

    assert_eq!(second["runner_status"], "running");
    assert_ne!(first["run_id"], second["run_id"]);
    assert_eq!(second["current_round"], 0);
}

#[test]
fn list_shows_every_simulation() {
    let sandbox = Sandbox::with_worker(TWO_ROUND_WORKER);
    sandbox
        .start("sim_a", &["--platform", "twitter", "--follow"])
        .passes();
    sandbox
        .start("sim_b", &["--platform", "twitter", "--follow"])
        .passes();

    let out = sandbox.simrun().args(&["list"]).passes();
    let stdout = out.stdout();
    assert!(stdout.starts_with("SIMULATION  STATUS"), "{stdout}");
    assert!(stdout.contains("sim_a"), "{stdout}");
    assert!(stdout.contains("sim_b"), "{stdout}");

    let page = sandbox
        .simrun()
        .args(&["list", "--limit", "1", "-o", "json"])
        .passes()
        .json();
    assert_eq!(page.as_array().map(Vec::len), Some(1));
}

#[test]
fn list_with_no_simulations() {
    let sandbox = Sandbox::new();
    sandbox
        .simrun()
        .args(&["list"])
        .passes()
        .stdout_eq("No simulations\n");
}

#[test]
fn purge_removes_finished_simulation() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox.start("sim1", &[]).passes();

    sandbox
        .simrun()
        .args(&["purge", "sim1"])
        .fails()
        .stderr_has("simulation sim1 is still running; stop it first");

    sandbox.simrun().args(&["stop", "sim1"]).passes();
    sandbox
        .simrun()
        .args(&["purge", "sim1"])
        .passes()
        .stdout_eq("Removed simulation sim1\n");
    sandbox
        .simrun()
        .args(&["status", "sim1"])
        .passes()
        .stdout_has("never been started");
}

#[test]
fn runner_log_is_written_to_state_dir() {
    let sandbox = Sandbox::with_worker(SLEEPING_WORKER);
    sandbox.start("sim1", &[]).passes();
    sandbox.simrun().args(&["stop", "sim1"]).passes();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || sandbox.runner_log().contains("sim1")),
        "runner log: {}",
        sandbox.runner_log()
    );
}
