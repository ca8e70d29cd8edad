// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::process::{
    LaunchError, LaunchSpec, ProbeError, ProcessAdapter, ProcessStatus, SignalError, StopSignal,
};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProcessAdapter
#[derive(Clone)]
pub struct TracedProcess<P> {
    inner: P,
}

impl<P> TracedProcess<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcess<P> {
    async fn launch(&self, spec: &LaunchSpec) -> Result<u32, LaunchError> {
        let span = tracing::info_span!(
            "process.launch",
            simulation_id = %spec.simulation_id,
            platform = spec.platform.as_str(),
        );
        async {
            tracing::info!(program = %spec.program, config = %spec.config_path.display(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.launch(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(pid) => tracing::info!(pid, elapsed_ms, "worker launched"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "launch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn status(&self, pid: u32) -> Result<ProcessStatus, ProbeError> {
        let result = self.inner.status(pid).await;
        match &result {
            Ok(status) => tracing::trace!(pid, ?status, "checked"),
            Err(e) => tracing::warn!(pid, error = %e, "probe failed"),
        }
        result
    }

    async fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), SignalError> {
        let result = self.inner.signal(pid, signal).await;
        tracing::info_span!("process.signal", pid, signal = signal.as_str()).in_scope(
            || match &result {
                Ok(()) => tracing::info!("signalled"),
                Err(e) => tracing::warn!(error = %e, "signal failed"),
            },
        );
        result
    }

    async fn release(&self, pid: u32) {
        self.inner.release(pid).await;
        tracing::debug!(pid, "released");
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
