//! MAYBELATER Simulation Support
//!
//! Every probabilistic decision and every sleep in the runtime goes
//! through the sources defined here, so a run can be pinned down
//! completely in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod random;
pub mod seed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use seed::{SeedSource, SimSeed};
