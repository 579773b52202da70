//! MAYBELATER Variable Stores
//!
//! Four independent storage models that events read and write:
//! - [`DeterministicStore`]: plain values with idle expiry
//! - [`ProbabilisticStore`]: existence re-decided on every read
//! - [`ParadoxStore`]: values that resolve after a random instant
//! - [`TemporalStore`]: retroactive, timestamped writes
//!
//! [`VariableStores`] bundles them and provides the merged inspection view.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deterministic;
pub mod error;
pub mod merged;
pub mod paradox;
pub mod probabilistic;
pub mod temporal;

pub use deterministic::DeterministicStore;
pub use error::StoreError;
pub use merged::VariableStores;
pub use paradox::{ParadoxEntry, ParadoxStore};
pub use probabilistic::ProbabilisticStore;
pub use temporal::TemporalStore;
