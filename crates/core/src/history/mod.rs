//! Bounded in-memory log of past invocations.
//!
//! The ledger keeps the most recent [`HISTORY_CAPACITY`] entries in
//! insertion order and evicts the oldest first. One ledger belongs to one
//! session; nothing here is shared across threads.

use chrono::{DateTime, Local};
use pf_protocol::{HistoryEntry, HistoryFilter};
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, then drop the oldest entries beyond capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// All entries, oldest first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Entries oldest first, without cloning.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Remove the first entry matching `(timestamp, session_id)`.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, timestamp: &DateTime<Local>, session_id: &str) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.matches(timestamp, session_id))
        {
            Some(index) => self.entries.remove(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Entries accepted by `filter`, in insertion order.
    pub fn filtered(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| filter.accepts(entry))
            .cloned()
            .collect()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.iter().rev().take(n).cloned().collect()
    }
}
