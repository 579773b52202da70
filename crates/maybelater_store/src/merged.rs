//! The four stores together, plus the merged inspection view.

use crate::{DeterministicStore, ParadoxStore, ProbabilisticStore, TemporalStore};
use maybelater_core::{Bindings, Timestamp};
use maybelater_sim::RandomSource;

/// Every variable store of one run
#[derive(Debug, Clone, Default)]
pub struct VariableStores {
    /// `meh` variables and loop bindings
    pub deterministic: DeterministicStore,
    /// `maybe` variables
    pub probabilistic: ProbabilisticStore,
    /// `paradox` variables
    pub paradox: ParadoxStore,
    /// `yesterdaze` variables
    pub temporal: TemporalStore,
}

impl VariableStores {
    /// Create empty stores
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort snapshot of every variable
    ///
    /// Layers, in order: deterministic values; every probabilistic entry
    /// (no existence roll); each paradox entry whose read succeeds right
    /// now (misses are dropped); finally the temporal override for each
    /// resulting name, when one is in effect.
    ///
    /// This is an inspection view. Execution uses the per-store reads.
    pub fn resolve_all(&self, now: Timestamp, rng: &mut dyn RandomSource) -> Bindings {
        let mut merged = self.deterministic.bindings().clone();
        for (name, value) in self.probabilistic.entries() {
            merged.insert(name.clone(), value.clone());
        }
        for name in self.paradox.names() {
            if let Ok(value) = self.paradox.read(name, now, rng) {
                merged.insert(name.to_string(), value.clone());
            }
        }
        for (name, value) in merged.iter_mut() {
            if let Some(past) = self.temporal.lookup(name, now) {
                *value = past.clone();
            }
        }
        merged
    }
}
