// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    LaunchError, LaunchSpec, ProbeError, ProcessAdapter, ProcessStatus, SignalError, StopSignal,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded process call
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessCall {
    Launch { pid: u32, spec: LaunchSpec },
    Status { pid: u32 },
    Signal { pid: u32, signal: StopSignal },
    Release { pid: u32 },
}

#[derive(Debug, Clone)]
struct FakeProcess {
    status: ProcessStatus,
    ignore_terminate: bool,
}

struct FakeProcessState {
    processes: HashMap<u32, FakeProcess>,
    specs: HashMap<u32, LaunchSpec>,
    calls: Vec<ProcessCall>,
    next_pid: u32,
    launch_failure: Option<String>,
    probe_failures: u32,
    ignore_terminate: bool,
}

/// Fake process adapter for testing.
///
/// Launched processes stay running until a test scripts an exit or the
/// adapter receives a signal the process does not ignore.
#[derive(Clone)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl Default for FakeProcessAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeProcessState {
                processes: HashMap::new(),
                specs: HashMap::new(),
                calls: Vec::new(),
                next_pid: 1000,
                launch_failure: None,
                probe_failures: 0,
                ignore_terminate: false,
            })),
        }
    }
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.inner.lock().calls.clone()
    }

    /// Specs of every launch, in order
    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProcessCall::Launch { spec, .. } => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    /// Signals sent to `pid`, in order
    pub fn signals(&self, pid: u32) -> Vec<StopSignal> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProcessCall::Signal { pid: p, signal } if *p == pid => Some(*signal),
                _ => None,
            })
            .collect()
    }

    /// Spec the process was launched with
    pub fn spec(&self, pid: u32) -> Option<LaunchSpec> {
        self.inner.lock().specs.get(&pid).cloned()
    }

    /// Current scripted status of `pid`
    pub fn current_status(&self, pid: u32) -> ProcessStatus {
        self.inner
            .lock()
            .processes
            .get(&pid)
            .map(|p| p.status)
            .unwrap_or(ProcessStatus::Gone)
    }

    /// Make the process exit with `code`
    pub fn set_exited(&self, pid: u32, code: i32) {
        self.set_status(pid, ProcessStatus::exited(code));
    }

    /// Make the process die from `signal`
    pub fn set_signalled(&self, pid: u32, signal: i32) {
        self.set_status(pid, ProcessStatus::signalled(signal));
    }

    /// Make the process vanish without a recorded exit status
    pub fn set_gone(&self, pid: u32) {
        self.set_status(pid, ProcessStatus::Gone);
    }

    /// Add a running process this adapter did not launch
    pub fn add_running(&self, pid: u32) {
        self.inner.lock().processes.insert(
            pid,
            FakeProcess {
                status: ProcessStatus::Running,
                ignore_terminate: false,
            },
        );
    }

    /// Fail the next launch with a spawn error
    pub fn fail_next_launch(&self, message: &str) {
        self.inner.lock().launch_failure = Some(message.to_string());
    }

    /// Fail the next `count` status probes
    pub fn fail_next_probes(&self, count: u32) {
        self.inner.lock().probe_failures = count;
    }

    /// Processes launched from now on survive SIGTERM
    pub fn ignore_terminate(&self, ignore: bool) {
        self.inner.lock().ignore_terminate = ignore;
    }

    /// Whether `pid` is still tracked (not released)
    pub fn is_tracked(&self, pid: u32) -> bool {
        self.inner.lock().specs.contains_key(&pid)
    }

    fn set_status(&self, pid: u32, status: ProcessStatus) {
        if let Some(process) = self.inner.lock().processes.get_mut(&pid) {
            process.status = status;
        }
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn launch(&self, spec: &LaunchSpec) -> Result<u32, LaunchError> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.launch_failure.take() {
            return Err(LaunchError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::other(message),
            });
        }

        let pid = inner.next_pid;
        inner.next_pid += 1;
        let ignore_terminate = inner.ignore_terminate;
        inner.processes.insert(
            pid,
            FakeProcess {
                status: ProcessStatus::Running,
                ignore_terminate,
            },
        );
        inner.specs.insert(pid, spec.clone());
        inner.calls.push(ProcessCall::Launch {
            pid,
            spec: spec.clone(),
        });
        Ok(pid)
    }

    async fn status(&self, pid: u32) -> Result<ProcessStatus, ProbeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Status { pid });
        if inner.probe_failures > 0 {
            inner.probe_failures -= 1;
            return Err(ProbeError::Wait {
                pid,
                source: std::io::Error::other("injected probe failure"),
            });
        }
        Ok(inner
            .processes
            .get(&pid)
            .map(|p| p.status)
            .unwrap_or(ProcessStatus::Gone))
    }

    async fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), SignalError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Signal { pid, signal });
        if let Some(process) = inner.processes.get_mut(&pid) {
            if !process.status.is_running() {
                return Ok(());
            }
            match signal {
                StopSignal::Terminate if process.ignore_terminate => {}
                StopSignal::Terminate => process.status = ProcessStatus::signalled(15),
                StopSignal::Kill => process.status = ProcessStatus::signalled(9),
            }
        }
        Ok(())
    }

    async fn release(&self, pid: u32) {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Release { pid });
        inner.specs.remove(&pid);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
