//! Seed management for reproducible runs.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Source of a run seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedSource {
    /// From a literal value
    Literal(u64),
    /// From a string (hashed)
    FromString(String),
    /// From the system clock (non-deterministic)
    Entropy,
}

impl SeedSource {
    /// Generate a seed value
    #[must_use]
    pub fn to_seed(&self) -> u64 {
        match self {
            SeedSource::Literal(seed) => *seed,
            SeedSource::FromString(s) => {
                let mut hasher = fnv::FnvHasher::default();
                hasher.write(s.as_bytes());
                hasher.finish()
            }
            SeedSource::Entropy => {
                use std::time::SystemTime;
                SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos() as u64
            }
        }
    }
}

/// Seed for one interpreter run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSeed {
    /// Base seed value
    pub seed: u64,
    /// Source of the seed
    pub source: SeedSource,
}

impl SimSeed {
    /// Create a new seed
    #[must_use]
    pub fn new(source: SeedSource) -> Self {
        let seed = source.to_seed();
        Self { seed, source }
    }

    /// Create a seed from a literal value
    #[must_use]
    pub fn from_literal(seed: u64) -> Self {
        Self::new(SeedSource::Literal(seed))
    }

    /// Create a seed from a string
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self::new(SeedSource::FromString(s))
    }

    /// Create a seed from entropy
    #[must_use]
    pub fn entropy() -> Self {
        Self::new(SeedSource::Entropy)
    }

    /// Create RNG from seed
    #[must_use]
    pub fn into_rng(self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl Default for SimSeed {
    fn default() -> Self {
        Self::new(SeedSource::Literal(42))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seed_source_literal() {
        let source = SeedSource::Literal(123);
        assert_eq!(source.to_seed(), 123);
    }

    #[test]
    fn test_seed_source_from_string_reproducible() {
        let source1 = SeedSource::FromString("maybe".to_string());
        let source2 = SeedSource::FromString("maybe".to_string());
        assert_eq!(source1.to_seed(), source2.to_seed());
    }

    #[test]
    fn test_seed_source_from_string_different() {
        let source1 = SeedSource::FromString("maybe".to_string());
        let source2 = SeedSource::FromString("later".to_string());
        assert_ne!(source1.to_seed(), source2.to_seed());
    }

    #[test]
    fn test_sim_seed_rng() {
        let seed = SimSeed::from_literal(42);
        let mut rng1 = seed.clone().into_rng();
        let mut rng2 = seed.into_rng();

        let val1: u64 = rng1.r#gen();
        let val2: u64 = rng2.r#gen();
        assert_eq!(val1, val2);
    }

    #[test]
    fn test_sim_seed_default() {
        let seed = SimSeed::default();
        assert_eq!(seed.seed, 42);
    }
}
