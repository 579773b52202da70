//! Delayed-resolution store.

use crate::error::StoreError;
use maybelater_core::{Timestamp, Value};
use maybelater_sim::RandomSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Odds that an unresolved paradox answers anyway
pub const EARLY_RESOLUTION_ODDS: f64 = 0.3;

/// A value and the instant it becomes certain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParadoxEntry {
    /// Stored value
    pub value: Value,
    /// From this instant on, every read succeeds
    pub resolves_at: Timestamp,
}

/// Values that resolve deterministically after `resolves_at`
#[derive(Debug, Clone, Default)]
pub struct ParadoxStore {
    entries: IndexMap<String, ParadoxEntry>,
}

impl ParadoxStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value resolving at `resolves_at`
    pub fn write(&mut self, name: &str, value: Value, resolves_at: Timestamp) {
        self.entries
            .insert(name.to_string(), ParadoxEntry { value, resolves_at });
    }

    /// Read a value
    ///
    /// Succeeds deterministically once `now >= resolves_at`; before that
    /// each read independently has a 30% chance of answering early.
    ///
    /// # Errors
    ///
    /// `Undefined` if never written, `Unresolved` if read too early
    pub fn read(
        &self,
        name: &str,
        now: Timestamp,
        rng: &mut dyn RandomSource,
    ) -> Result<&Value, StoreError> {
        let entry = self.entries.get(name).ok_or_else(|| StoreError::Undefined {
            name: name.to_string(),
        })?;
        if now >= entry.resolves_at || rng.chance(EARLY_RESOLUTION_ODDS) {
            Ok(&entry.value)
        } else {
            Err(StoreError::Unresolved {
                name: name.to_string(),
            })
        }
    }

    /// Look up an entry without resolving it
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ParadoxEntry> {
        self.entries.get(name)
    }

    /// Names held by the store
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maybelater_core::Duration;
    use maybelater_sim::ScriptedRandom;

    #[test]
    fn test_resolves_deterministically_at_deadline() {
        let now = Timestamp::new(1_000, 0);
        let mut store = ParadoxStore::new();
        store.write("p", Value::Int(7), now.add(&Duration::from_secs(2)));

        let mut rng = ScriptedRandom::never();
        let one_second_in = now.add(&Duration::from_secs(1));
        assert_eq!(
            store.read("p", one_second_in, &mut rng),
            Err(StoreError::Unresolved { name: "p".to_string() })
        );

        let two_seconds_in = now.add(&Duration::from_secs(2));
        for _ in 0..3 {
            assert_eq!(store.read("p", two_seconds_in, &mut rng), Ok(&Value::Int(7)));
        }
    }

    #[test]
    fn test_early_resolution_roll() {
        let now = Timestamp::new(1_000, 0);
        let mut store = ParadoxStore::new();
        store.write("p", Value::Int(7), now.add(&Duration::from_secs(3)));

        let mut rng = ScriptedRandom::never().with_rolls([0.29, 0.31]);
        assert!(store.read("p", now, &mut rng).is_ok());
        assert!(store.read("p", now, &mut rng).is_err());
    }

    #[test]
    fn test_resolved_read_consumes_no_roll() {
        let now = Timestamp::new(1_000, 0);
        let mut store = ParadoxStore::new();
        store.write("p", Value::Int(7), now);

        let mut rng = ScriptedRandom::never();
        assert!(store.read("p", now, &mut rng).is_ok());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_undefined() {
        let store = ParadoxStore::new();
        let mut rng = ScriptedRandom::always();
        assert!(matches!(
            store.read("p", Timestamp::new(1, 0), &mut rng),
            Err(StoreError::Undefined { .. })
        ));
    }
}
