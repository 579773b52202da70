//! Probabilistic-existence store.

use crate::error::StoreError;
use maybelater_core::{Bindings, Value};
use maybelater_sim::RandomSource;

/// Odds that a maybe variable exists on any single read
pub const EXISTENCE_ODDS: f64 = 0.5;

/// Values whose existence is re-rolled on every read
///
/// A lost roll fails the read but keeps the entry, so the same name can
/// succeed on one read and fail on the next.
#[derive(Debug, Clone, Default)]
pub struct ProbabilisticStore {
    values: Bindings,
}

impl ProbabilisticStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value
    pub fn write(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Read a value, subject to an existence roll
    ///
    /// # Errors
    ///
    /// `Undefined` if never written, `NotYetReal` if the roll is lost
    pub fn read(&self, name: &str, rng: &mut dyn RandomSource) -> Result<&Value, StoreError> {
        let value = self.values.get(name).ok_or_else(|| StoreError::Undefined {
            name: name.to_string(),
        })?;
        if rng.chance(EXISTENCE_ODDS) {
            Ok(value)
        } else {
            Err(StoreError::NotYetReal {
                name: name.to_string(),
            })
        }
    }

    /// Every entry, bypassing existence rolls
    #[must_use]
    pub fn entries(&self) -> &Bindings {
        &self.values
    }

    /// Number of entries
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
