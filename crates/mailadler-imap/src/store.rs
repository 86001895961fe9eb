//! Header store for the fetch in progress.

use std::collections::VecDeque;

use crate::types::MessageSummary;

/// Ordered summaries collected for one FETCH command.
///
/// Servers answer a sequence range from low to high, and summaries are
/// prepended, so a snapshot lists the highest-numbered message first. UIDs
/// are not deduplicated: feeding overlapping fetches into one cycle yields
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct HeaderStore {
    headers: VecDeque<MessageSummary>,
}

impl HeaderStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new fetch cycle, discarding previous results.
    pub fn begin_fetch(&mut self) {
        self.headers.clear();
    }

    /// Adds a summary in front of the ones already collected.
    pub fn append(&mut self, summary: MessageSummary) {
        self.headers.push_front(summary);
    }

    /// Returns the collected summaries, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageSummary> {
        self.headers.iter().cloned().collect()
    }

    /// Number of collected summaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
