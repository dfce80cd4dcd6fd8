//! # History Ring
//!
//! Bounded, navigable list of previously submitted lines.
//!
//! Suppression policy: empty (post-trim) lines are never pushed and a line
//! equal to the newest entry is not pushed again; non-consecutive
//! duplicates are kept. The traversal cursor exists only during an active
//! up/down traversal and is reset by every push.

use std::collections::VecDeque;

/// Bounded ring of submitted lines with an up/down traversal cursor
#[derive(Debug)]
pub struct HistoryRing {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: Option<usize>,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            cursor: None,
        }
    }

    /// Append a submitted line, evicting the oldest entry at capacity.
    /// Resets any active traversal.
    pub fn push(&mut self, line: &str) {
        self.cursor = None;
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.entries.back().map(String::as_str) == Some(line) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// Step one entry toward the oldest. Returns `None` when the ring is
    /// empty or the cursor is already at the oldest entry.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => self.entries.len() - 1,
            Some(0) => return None,
            Some(idx) => idx - 1,
        };
        self.cursor = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Step one entry toward the newest. Returns `None` past the newest
    /// entry (the caller clears the input line) and ends the traversal.
    pub fn next(&mut self) -> Option<&str> {
        let idx = self.cursor?;
        if idx + 1 >= self.entries.len() {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(idx + 1);
        self.entries.get(idx + 1).map(String::as_str)
    }

    /// The newest entry, if any
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Ring contents, oldest first. Consumed read-only by the default
    /// autocomplete provider.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_with(capacity: usize, lines: &[&str]) -> HistoryRing {
        let mut ring = HistoryRing::new(capacity);
        for line in lines {
            ring.push(line);
        }
        ring
    }

    #[test]
    fn push_evicts_oldest_at_capacity() {
        // N > K submissions retain the K most recent, in order.
        let ring = ring_with(3, &["one", "two", "three", "four", "five"]);
        let entries: Vec<&str> = ring.entries().collect();
        assert_eq!(entries, vec!["three", "four", "five"]);
    }

    #[test]
    fn push_suppresses_empty_and_consecutive_duplicates() {
        let ring = ring_with(10, &["build", "", "   ", "build", "deploy", "build"]);
        let entries: Vec<&str> = ring.entries().collect();
        assert_eq!(entries, vec!["build", "deploy", "build"]);
    }

    #[test]
    fn previous_clamps_at_oldest() {
        // previous() never steps past the oldest entry.
        let mut ring = ring_with(10, &["a", "b", "c"]);
        assert_eq!(ring.previous(), Some("c"));
        assert_eq!(ring.previous(), Some("b"));
        assert_eq!(ring.previous(), Some("a"));
        assert_eq!(ring.previous(), None);
        assert_eq!(ring.previous(), None);
    }

    #[test]
    fn next_walks_back_to_empty_at_the_top() {
        let mut ring = ring_with(10, &["a", "b", "c"]);
        ring.previous();
        ring.previous();
        ring.previous();
        assert_eq!(ring.next(), Some("b"));
        assert_eq!(ring.next(), Some("c"));
        assert_eq!(ring.next(), None);
        // Traversal ended; another next still yields the empty boundary
        assert_eq!(ring.next(), None);
    }

    #[test]
    fn next_without_traversal_yields_empty_boundary() {
        let mut ring = ring_with(10, &["a"]);
        assert_eq!(ring.next(), None);
    }

    #[test]
    fn previous_on_empty_ring_is_none() {
        let mut ring = HistoryRing::new(10);
        assert_eq!(ring.previous(), None);
    }

    #[test]
    fn push_resets_traversal() {
        let mut ring = ring_with(10, &["a", "b"]);
        assert_eq!(ring.previous(), Some("b"));
        ring.push("c");
        assert_eq!(ring.previous(), Some("c"));
    }

    #[test]
    fn push_trims_before_storing() {
        let ring = ring_with(10, &["  help  "]);
        let entries: Vec<&str> = ring.entries().collect();
        assert_eq!(entries, vec!["help"]);
    }
}
