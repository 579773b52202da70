//! Injectable random sources.
//!
//! The runtime never touches a global RNG. Production runs use
//! [`SeededRandom`]; tests use [`ScriptedRandom`] to force either branch
//! of a probabilistic decision.

use crate::seed::SimSeed;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of randomness for every probabilistic decision
pub trait RandomSource {
    /// Next roll in `[0, 1]`
    fn next_unit(&mut self) -> f64;

    /// Returns true with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform float in `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }

    /// Uniform integer in `[low, high]`
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.next_unit() * span).floor() as i64;
        (low + offset).min(high)
    }
}

/// Seeded ChaCha source, reproducible from a [`SimSeed`]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create from a seed
    #[must_use]
    pub fn new(seed: SimSeed) -> Self {
        Self {
            rng: seed.into_rng(),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(SimSeed::default())
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Scripted source for tests
///
/// Queued rolls are consumed first, then the fallback roll repeats
/// forever. A roll of `0.0` makes every `chance` succeed and every range
/// pick its low end; `1.0` makes every `chance` fail and every range pick
/// its high end.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    rolls: VecDeque<f64>,
    fallback: f64,
    draws: usize,
}

impl ScriptedRandom {
    /// Always roll `fallback`
    #[must_use]
    pub fn constant(fallback: f64) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: fallback.clamp(0.0, 1.0),
            draws: 0,
        }
    }

    /// Every chance succeeds
    #[must_use]
    pub fn always() -> Self {
        Self::constant(0.0)
    }

    /// Every chance fails
    #[must_use]
    pub fn never() -> Self {
        Self::constant(1.0)
    }

    /// Queue specific rolls ahead of the fallback
    #[must_use]
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.rolls.extend(rolls.into_iter().map(|r| r.clamp(0.0, 1.0)));
        self
    }

    /// Number of rolls drawn so far
    #[must_use]
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scripted_always() {
        let mut rng = ScriptedRandom::always();
        assert!(rng.chance(0.5));
        assert!(rng.chance(0.01));
        assert_eq!(rng.uniform(0.5, 1.5), 0.5);
        assert_eq!(rng.int_inclusive(1, 3), 1);
    }

    #[test]
    fn test_scripted_never() {
        let mut rng = ScriptedRandom::never();
        assert!(!rng.chance(0.5));
        assert!(!rng.chance(1.0));
        assert_eq!(rng.uniform(0.5, 1.5), 1.5);
        assert_eq!(rng.int_inclusive(1, 3), 3);
    }

    #[test]
    fn test_scripted_rolls_then_fallback() {
        let mut rng = ScriptedRandom::never().with_rolls([0.0, 0.6]);
        assert!(rng.chance(0.5));
        assert!(!rng.chance(0.5));
        assert!(!rng.chance(0.5));
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_int_inclusive_degenerate_range() {
        let mut rng = ScriptedRandom::never();
        assert_eq!(rng.int_inclusive(4, 4), 4);
        assert_eq!(rng.int_inclusive(5, 2), 5);
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = SeededRandom::new(SimSeed::from_literal(7));
        let mut b = SeededRandom::new(SimSeed::from_literal(7));
        for _ in 0..16 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    proptest! {
        #[test]
        fn prop_seeded_ranges_stay_in_bounds(seed: u64, low in -100i64..100, span in 0i64..50) {
            let mut rng = SeededRandom::new(SimSeed::from_literal(seed));
            let high = low + span;
            let n = rng.int_inclusive(low, high);
            prop_assert!(n >= low && n <= high);
            let x = rng.uniform(0.1, 1.0);
            prop_assert!((0.1..=1.0).contains(&x));
        }
    }
}
