//! Test helpers for behavioral specifications.
//!
//! Provides high-level DSL for testing simrun CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
//
// IMPORTANT:
//   Do NOT change these.
//   File a performance bug instead.
const SIMRUN_POLL_MS: &str = "10";
const SIMRUN_GRACE_MS: &str = "500";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// This works with both standard builds and llvm-cov coverage runs.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>, so its
    // grandparent is target/debug/ where simrun is built.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns a Command configured to run the simrun binary
pub fn simrun_cmd() -> Command {
    Command::new(binary_path("simrun"))
}

/// Create a CLI builder for simrun commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("SIMRUN_POLL_MS".into(), SIMRUN_POLL_MS.into()),
                ("SIMRUN_GRACE_MS".into(), SIMRUN_GRACE_MS.into()),
                ("NO_COLOR".into(), "1".into()),
            ],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = simrun_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Parent overrides would point tests at the wrong state or worker.
        for var in ["SIMRUN_STATE_DIR", "SIMRUN_WORKER", "SIMRUN_LOG", "COLOR"] {
            cmd.env_remove(var);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Parse stdout as JSON (for `-o json` runs).
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap_or_else(|e| {
            panic!("stdout is not JSON: {e}\nstdout: {}", self.stdout())
        })
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    /// **Prefer this for format specs** - catches format regressions.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout contains substring.
    /// Use when exact comparison isn't practical.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stdout does not contain substring.
    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
/// Uses aggressive polling for fast tests.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Sandbox
// =============================================================================

/// 2 one-hour rounds.
pub const SIM_CONFIG: &str =
    r#"{"time_config": {"total_simulation_hours": 2, "minutes_per_round": 60}}"#;

/// Emits two rounds on twitter (three actions, one failed) and exits cleanly.
pub const TWO_ROUND_WORKER: &str = r#"#!/bin/sh
emit() { printf '%s\n' "$1"; }
emit '{"timestamp":"2026-01-01T00:00:00","platform":"twitter","event_type":"simulation_start","total_rounds":2,"agents_count":2}'
emit '{"timestamp":"2026-01-01T00:00:01","platform":"twitter","event_type":"round_start","round":1,"simulated_hour":8}'
emit '{"timestamp":"2026-01-01T00:00:02","platform":"twitter","round":1,"agent_id":1,"agent_name":"ada","action_type":"CREATE_POST","action_args":{"content":"hello"},"success":true}'
emit '{"timestamp":"2026-01-01T00:00:03","platform":"twitter","round":1,"agent_id":2,"agent_name":"bob","action_type":"LIKE_POST","action_args":{"post_id":1},"success":false}'
emit '{"timestamp":"2026-01-01T00:00:04","platform":"twitter","event_type":"round_end","round":1,"actions_count":2}'
emit '{"timestamp":"2026-01-01T00:00:05","platform":"twitter","event_type":"round_start","round":2,"simulated_hour":9}'
emit '{"timestamp":"2026-01-01T00:00:06","platform":"twitter","round":2,"agent_id":1,"agent_name":"ada","action_type":"CREATE_POST","action_args":{"content":"again"},"success":true}'
emit '{"timestamp":"2026-01-01T00:00:07","platform":"twitter","event_type":"round_end","round":2,"actions_count":1}'
emit '{"timestamp":"2026-01-01T00:00:08","platform":"twitter","event_type":"simulation_end","total_rounds":2,"total_actions":3}'
"#;

/// Writes a traceback to stderr and exits 3.
pub const CRASHING_WORKER: &str = r#"#!/bin/sh
echo "Traceback (most recent call last):" >&2
echo "RuntimeError: model endpoint unreachable" >&2
exit 3
"#;

/// Runs until signalled.
pub const SLEEPING_WORKER: &str = "#!/bin/sh\nexec sleep 30\n";

/// Isolated state directory plus a simulation config and worker script.
pub struct Sandbox {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let sandbox = Self {
            dir: tempfile::tempdir().unwrap(),
            state_dir: tempfile::tempdir().unwrap(),
        };
        sandbox.file("simulation_config.json", SIM_CONFIG);
        sandbox
    }

    /// A sandbox whose worker is the given shell script.
    pub fn with_worker(script: &str) -> Self {
        let sandbox = Self::new();
        sandbox.file("worker.sh", script);
        let path = sandbox.path().join("worker.sh");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        sandbox
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("simulation_config.json")
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    /// Run simrun against this sandbox's state dir and worker
    pub fn simrun(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("SIMRUN_STATE_DIR", self.state_path())
            .env("SIMRUN_WORKER", self.path().join("worker.sh"))
    }

    /// `simrun start <id> --config <sandbox config>` plus extra args
    pub fn start(&self, id: &str, extra: &[&str]) -> CliBuilder {
        let config = self.config_path();
        let config = config.to_string_lossy();
        let mut args = vec!["start", id, "--config", config.as_ref()];
        args.extend_from_slice(extra);
        self.simrun().args(&args)
    }

    /// `runner_status` from `simrun status <id> -o json`
    pub fn runner_status(&self, id: &str) -> String {
        let out = self.simrun().args(&["status", id, "-o", "json"]).passes();
        out.json()["runner_status"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    /// Read the runner log (for debugging test failures)
    pub fn runner_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("simrun.log"))
            .unwrap_or_else(|_| "(no runner log)".to_string())
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        // Stop anything still running (no-op when nothing is)
        let Ok(output) = self
            .simrun()
            .args(&["list", "-o", "json"])
            .command()
            .output()
        else {
            return;
        };
        let Ok(serde_json::Value::Array(states)) = serde_json::from_slice(&output.stdout) else {
            return;
        };
        for state in states {
            if state["runner_status"] == "running" {
                if let Some(id) = state["simulation_id"].as_str() {
                    let _ = self.simrun().args(&["stop", id]).command().output();
                }
            }
        }
    }
}
