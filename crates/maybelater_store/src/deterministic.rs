//! Deterministic store with idle expiry.

use maybelater_core::{Bindings, Duration, Timestamp, Value};
use indexmap::IndexMap;

/// Plain name to value mapping plus last-access tracking
///
/// Every `write` records an access time. Names bound with `bind` carry no
/// access time and are never expired.
#[derive(Debug, Clone, Default)]
pub struct DeterministicStore {
    values: Bindings,
    last_access: IndexMap<String, Timestamp>,
}

impl DeterministicStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value and refresh its access time
    pub fn write(&mut self, name: &str, value: Value, now: Timestamp) {
        self.values.insert(name.to_string(), value);
        self.last_access.insert(name.to_string(), now);
    }

    /// Bind a value without access tracking (loop variables)
    pub fn bind(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Refresh the access time of a tracked name
    ///
    /// Untracked names stay untracked.
    pub fn touch(&mut self, name: &str, now: Timestamp) {
        if let Some(at) = self.last_access.get_mut(name) {
            *at = now;
        }
    }

    /// Read a value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether `name` holds a value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Last access time of a tracked name
    #[must_use]
    pub fn last_access(&self, name: &str) -> Option<Timestamp> {
        self.last_access.get(name).copied()
    }

    /// Delete every tracked entry idle for longer than `max_idle`
    ///
    /// No-op when `suppressed`. Returns the expired names.
    pub fn expire_unused(
        &mut self,
        now: Timestamp,
        max_idle: Duration,
        suppressed: bool,
    ) -> Vec<String> {
        if suppressed {
            return Vec::new();
        }
        let expired: Vec<String> = self
            .last_access
            .iter()
            .filter(|(_, at)| now.duration_since(at) > max_idle)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            self.values.shift_remove(name);
            self.last_access.shift_remove(name);
        }
        if !expired.is_empty() {
            tracing::debug!(?expired, "expired idle variables");
        }
        expired
    }

    /// Snapshot of every value, usable as evaluator bindings
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.values
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
