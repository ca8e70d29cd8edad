// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recent events per simulation, held in memory.
//!
//! Each simulation gets a bounded ring buffer; once full, the oldest event
//! is dropped. The monitor for a simulation is its only writer. Full
//! history stays in the stdout log.

use parking_lot::RwLock;
use simrun_core::{SimEvent, SimulationId};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_BRIDGE_CAPACITY: usize = 256;

pub struct ActionBridge {
    capacity: usize,
    buffers: RwLock<HashMap<SimulationId, VecDeque<SimEvent>>>,
}

impl Default for ActionBridge {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_CAPACITY)
    }
}

impl ActionBridge {
    /// Capacity is per simulation; zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffers: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, id: &SimulationId, event: SimEvent) {
        self.extend(id, std::iter::once(event));
    }

    pub fn extend(&self, id: &SimulationId, events: impl IntoIterator<Item = SimEvent>) {
        let mut buffers = self.buffers.write();
        let buffer = buffers.entry(id.clone()).or_default();
        for event in events {
            if buffer.len() == self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(event);
        }
    }

    /// Up to `limit` most recent events, oldest first.
    pub fn recent(&self, id: &SimulationId, limit: usize) -> Vec<SimEvent> {
        let buffers = self.buffers.read();
        let Some(buffer) = buffers.get(id) else {
            return Vec::new();
        };
        let skip = buffer.len().saturating_sub(limit);
        buffer.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self, id: &SimulationId) -> usize {
        self.buffers.read().get(id).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, id: &SimulationId) -> bool {
        self.len(id) == 0
    }

    pub fn clear(&self, id: &SimulationId) {
        self.buffers.write().remove(id);
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
