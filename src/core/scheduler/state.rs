//! Mutable state owned by the wave loop

use crate::config::EngineConfig;
use crate::core::batch::WorkItem;
use std::collections::HashSet;

/// State of one run. Only the wave loop touches it, and only between waves.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    /// Unresolved items, in first-seen input order
    pub pending: Vec<WorkItem>,
    pub current_workers: usize,
    pub current_batch_size: usize,
    pub wave_index: u32,
    pub total_succeeded: usize,
}

impl EngineState {
    /// Build the initial state. Duplicate ids are dropped (first occurrence
    /// kept); the number dropped is returned alongside.
    pub fn new(items: Vec<WorkItem>, config: &EngineConfig) -> (Self, usize) {
        let received = items.len();
        let mut seen = HashSet::with_capacity(received);
        let pending: Vec<WorkItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();
        let duplicates = received - pending.len();

        let state = Self {
            pending,
            current_workers: config.initial_workers(),
            current_batch_size: config.initial_batch_size(),
            wave_index: 0,
            total_succeeded: 0,
        };
        (state, duplicates)
    }

    /// Split the pending set into batches of the current size; the last one
    /// may be smaller.
    pub fn partition(&self) -> Vec<Vec<WorkItem>> {
        self.pending
            .chunks(self.current_batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }
}
