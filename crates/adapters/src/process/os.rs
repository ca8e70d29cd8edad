// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process adapter

use super::{
    LaunchError, LaunchSpec, ProbeError, ProcessAdapter, ProcessStatus, SignalError, StopSignal,
};
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::{Child, Command};

enum ChildSlot {
    Live(Child),
    Exited(ExitStatus),
}

/// Launches workers as real OS process groups.
///
/// Children spawned by this adapter are polled with a non-blocking wait so
/// their exit codes are observed and zombies reaped. Any other pid (for
/// example one recorded by an earlier orchestrator) is probed with signal 0.
#[derive(Clone, Default)]
pub struct OsProcessAdapter {
    children: Arc<Mutex<HashMap<u32, ChildSlot>>>,
}

impl OsProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessAdapter for OsProcessAdapter {
    async fn launch(&self, spec: &LaunchSpec) -> Result<u32, LaunchError> {
        if !spec.config_path.is_file() {
            return Err(LaunchError::ConfigMissing(spec.config_path.clone()));
        }

        let stdout = open_log(&spec.stdout_log)?;
        let stderr = open_log(&spec.stderr_log)?;

        let mut cmd = Command::new(&spec.program);
        cmd.args(spec.worker_args())
            .envs(spec.worker_env())
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .process_group(0);

        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| LaunchError::NoPid {
            program: spec.program.clone(),
        })?;

        self.children.lock().insert(pid, ChildSlot::Live(child));
        Ok(pid)
    }

    async fn status(&self, pid: u32) -> Result<ProcessStatus, ProbeError> {
        {
            let mut children = self.children.lock();
            if let Some(slot) = children.get_mut(&pid) {
                let exited = match slot {
                    ChildSlot::Exited(status) => Some(*status),
                    ChildSlot::Live(child) => child
                        .try_wait()
                        .map_err(|source| ProbeError::Wait { pid, source })?,
                };
                return Ok(match exited {
                    Some(status) => {
                        *slot = ChildSlot::Exited(status);
                        exit_status(status)
                    }
                    None => ProcessStatus::Running,
                });
            }
        }
        probe(pid)
    }

    async fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), SignalError> {
        let target = to_pid(pid).ok_or(SignalError::InvalidPid(pid))?;
        let sig = match signal {
            StopSignal::Terminate => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        };
        if killpg(target, sig).is_ok() {
            return Ok(());
        }
        match kill(target, sig) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(source) => Err(SignalError::Send { pid, source }),
        }
    }

    async fn release(&self, pid: u32) {
        self.children.lock().remove(&pid);
    }
}

fn open_log(path: &Path) -> Result<File, LaunchError> {
    let open = || {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LaunchError::Log {
        path: path.to_path_buf(),
        source,
    })
}

fn exit_status(status: ExitStatus) -> ProcessStatus {
    ProcessStatus::Exited {
        code: status.code(),
        signal: status.signal(),
    }
}

/// Signal-0 probe for pids this adapter did not spawn.
fn probe(pid: u32) -> Result<ProcessStatus, ProbeError> {
    let Some(target) = to_pid(pid) else {
        return Ok(ProcessStatus::Gone);
    };
    match kill(target, None) {
        // EPERM: the pid exists but belongs to someone else
        Ok(()) | Err(Errno::EPERM) => Ok(ProcessStatus::Running),
        Err(Errno::ESRCH) => Ok(ProcessStatus::Gone),
        Err(source) => Err(ProbeError::Probe { pid, source }),
    }
}

/// Pid 0 and values past `i32::MAX` would address groups, never one worker.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "os_tests.rs"]
mod tests;
