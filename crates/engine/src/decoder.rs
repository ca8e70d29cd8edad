// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning worker stdout lines into events.

use simrun_core::SimEvent;

/// Decodes one stdout line. Lines that are not events yield `None`.
pub trait LineDecoder: Send + Sync + 'static {
    fn decode(&self, line: &str) -> Option<SimEvent>;
}

/// Action-log decoder: one JSON object per line.
///
/// Plain log text, JSON that is not an object, and objects that are not
/// recognizable events are all skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineDecoder;

impl LineDecoder for JsonLineDecoder {
    fn decode(&self, line: &str) -> Option<SimEvent> {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        match serde_json::from_str(trimmed) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::trace!(error = %e, "skipping non-event line");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
