//! Time/priority ordered event queue.
//!
//! Entries are ordered by:
//! - scheduled time, earliest first
//! - priority, lower first
//! - push sequence, so equal keys keep FIFO order
//!
//! A BTreeMap keyed on all three gives a total, deterministic order.

use crate::event::Event;
use maybelater_core::{Duration, Timestamp};
use std::collections::BTreeMap;

/// Ordering key of a queued event
///
/// Field order matters: the derived `Ord` compares time, then priority,
/// then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    /// Earliest dispatch time
    pub scheduled_time: Timestamp,
    /// Lower runs first among equal times
    pub priority: i64,
    /// Monotonic push counter
    pub sequence: u64,
}

/// An event together with its key
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    /// Ordering key
    pub key: EntryKey,
    /// Scheduled event
    pub event: Event,
}

/// Min-ordered event queue
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    entries: BTreeMap<EntryKey, Event>,
    next_sequence: u64,
}

impl EventQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `now + delay`
    pub fn push(&mut self, event: Event, delay: Duration, priority: i64, now: Timestamp) -> EntryKey {
        self.push_at(event, now.add(&delay), priority)
    }

    /// Schedule `event` at an absolute time
    pub fn push_at(&mut self, event: Event, scheduled_time: Timestamp, priority: i64) -> EntryKey {
        let key = EntryKey {
            scheduled_time,
            priority,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(key, event);
        key
    }

    /// Smallest entry without removing it
    #[must_use]
    pub fn peek_min(&self) -> Option<(&EntryKey, &Event)> {
        self.entries.first_key_value()
    }

    /// Remove and return the smallest entry
    pub fn pop_min(&mut self) -> Option<QueueEntry> {
        self.entries
            .pop_first()
            .map(|(key, event)| QueueEntry { key, event })
    }

    /// Move every entry to `at`, keeping priorities
    ///
    /// Entries are re-sequenced in their current order, so the relative
    /// order of equal priorities survives. Returns the number moved.
    pub fn collapse(&mut self, at: Timestamp) -> usize {
        let drained = std::mem::take(&mut self.entries);
        let count = drained.len();
        for (key, event) in drained {
            self.push_at(event, at, key.priority);
        }
        count
    }

    /// Entries in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = (&EntryKey, &Event)> {
        self.entries.iter()
    }

    /// Number of queued entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn start() -> Timestamp {
        Timestamp::new(1_700_000_000, 0)
    }

    fn print(tag: &str) -> Event {
        Event::PrintStatement {
            expr: tag.to_string(),
        }
    }

    fn tag(entry: &QueueEntry) -> &str {
        match &entry.event {
            Event::PrintStatement { expr } => expr,
            other => other.kind(),
        }
    }

    #[test]
    fn test_time_then_priority_then_fifo() {
        let mut queue = EventQueue::new();
        queue.push(print("late"), Duration::from_secs(2), 0, start());
        queue.push(print("prio1"), Duration::zero(), 1, start());
        queue.push(print("first"), Duration::zero(), 0, start());
        queue.push(print("second"), Duration::zero(), 0, start());

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_min())
            .map(|e| tag(&e).to_string())
            .collect();
        assert_eq!(order, vec!["first", "second", "prio1", "late"]);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut queue = EventQueue::new();
        assert!(queue.peek_min().is_none());
        queue.push(print("a"), Duration::zero(), 0, start());
        assert!(queue.peek_min().is_some());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_collapse_preserves_priority_and_order() {
        let mut queue = EventQueue::new();
        let far = Duration::from_secs(10);
        queue.push(print("a"), far, 1, start());
        queue.push(print("b"), far, 0, start());
        queue.push(print("c"), Duration::from_secs(20), 0, start());

        let at = start().add(&Duration::from_millis(1));
        assert_eq!(queue.collapse(at), 3);
        assert!(queue.iter().all(|(k, _)| k.scheduled_time == at));

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_min())
            .map(|e| tag(&e).to_string())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    proptest! {
        #[test]
        fn prop_pop_order_is_sorted(items in proptest::collection::vec((0u64..50, -3i64..3), 1..64)) {
            let mut queue = EventQueue::new();
            for (millis, priority) in &items {
                queue.push(print("x"), Duration::from_millis(*millis), *priority, start());
            }
            let keys: Vec<EntryKey> = std::iter::from_fn(|| queue.pop_min()).map(|e| e.key).collect();
            prop_assert_eq!(keys.len(), items.len());
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
