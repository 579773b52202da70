//! Retroactive, timestamped store.

use maybelater_core::{Timestamp, Value};
use indexmap::IndexMap;

/// Per-name history of `(effective_time, value)` pairs
///
/// Each history stays sorted by effective time, newest first. A read
/// returns the newest entry already in effect and never fails: when no
/// entry qualifies the caller's fallback comes back instead.
#[derive(Debug, Clone, Default)]
pub struct TemporalStore {
    history: IndexMap<String, Vec<(Timestamp, Value)>>,
}

impl TemporalStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as effective `seconds_ago` before `now`
    ///
    /// Negative offsets place the entry in the future.
    pub fn write(&mut self, name: &str, value: Value, seconds_ago: f64, now: Timestamp) {
        let effective = now.shifted_secs(-seconds_ago);
        let entries = self.history.entry(name.to_string()).or_default();
        // Newest first; a later write wins over an equal effective time
        let at = entries.partition_point(|(t, _)| *t > effective);
        entries.insert(at, (effective, value));
    }

    /// Newest value effective strictly before `now`, else `fallback`
    #[must_use]
    pub fn read(&self, name: &str, now: Timestamp, fallback: Value) -> Value {
        self.lookup(name, now).cloned().unwrap_or(fallback)
    }

    /// Newest value effective strictly before `now`, if any
    #[must_use]
    pub fn lookup(&self, name: &str, now: Timestamp) -> Option<&Value> {
        self.history
            .get(name)?
            .iter()
            .find(|(effective, _)| *effective < now)
            .map(|(_, value)| value)
    }

    /// Full history for a name, newest first
    #[must_use]
    pub fn history(&self, name: &str) -> &[(Timestamp, Value)] {
        self.history.get(name).map_or(&[], Vec::as_slice)
    }

    /// Number of names with history
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
