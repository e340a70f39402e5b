//! Bounded, chronologically ordered position history.

use std::collections::VecDeque;

use crate::models::HistoryEntry;

/// FIFO buffer of the most recent history entries.
///
/// Entries are kept in insertion order, which is capture order. Once the
/// buffer holds more than `capacity` entries the oldest are dropped.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest retained entry.
    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Append an entry, then evict from the front down to capacity.
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Owned copy of the history, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
