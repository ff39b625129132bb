//! Age-Bounded Time Window

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Ordered instants no older than `span` relative to the latest eviction
#[derive(Debug, Clone)]
pub struct TimeWindow {
    entries: VecDeque<Instant>,
    span: Duration,
}

impl TimeWindow {
    /// Create a window retaining entries younger than `span`
    pub fn new(span: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            span,
        }
    }

    /// Window span
    pub fn span(&self) -> Duration {
        self.span
    }

    /// Record an instant. Entries are expected in non-decreasing order.
    pub fn push(&mut self, at: Instant) {
        self.entries.push_back(at);
    }

    /// Drop every entry with `now - entry >= span`
    pub fn evict(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        while let Some(&oldest) = self.entries.front() {
            if now.saturating_duration_since(oldest) >= self.span {
                self.entries.pop_front();
            } else {
                break;
            }
        }
        before - self.entries.len()
    }

    /// Number of entries currently retained
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.entries.iter()
    }

    /// Clear the window
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
