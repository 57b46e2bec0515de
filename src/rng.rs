//! Deterministic simulation randomness.
//!
//! Wraps `ChaCha8Rng` so identical seeds produce identical candidate draws and
//! admission decisions across platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
const DEFAULT_SEED: u64 = 42;

/// Source of uniform random integers supplied by the host
pub trait RandomSource {
    /// Uniform integer in `[0, max_exclusive)`; returns 0 when `max_exclusive` is 0
    fn random_uint(&mut self, max_exclusive: u32) -> u32;
}

/// Seeded random stream, one per component that needs its own sequence
#[derive(Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SimRng {
    fn random_uint(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 {
            return 0;
        }
        self.0.gen_range(0..max_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_deterministic() {
        let mut a = SimRng::default();
        let mut b = SimRng::default();
        let vals_a: Vec<u32> = (0..10).map(|_| a.random_uint(1000)).collect();
        let vals_b: Vec<u32> = (0..10).map(|_| b.random_uint(1000)).collect();
        assert_eq!(vals_a, vals_b);
    }

    #[test]
    fn test_from_seed_u64_deterministic() {
        let mut a = SimRng::from_seed_u64(12345);
        let mut b = SimRng::from_seed_u64(12345);
        let vals_a: Vec<u32> = (0..20).map(|_| a.random_uint(500)).collect();
        let vals_b: Vec<u32> = (0..20).map(|_| b.random_uint(500)).collect();
        assert_eq!(vals_a, vals_b);
    }

    #[test]
    fn test_random_uint_stays_in_range() {
        let mut rng = SimRng::from_seed_u64(7);
        for _ in 0..1000 {
            assert!(rng.random_uint(5) < 5);
        }
        assert_eq!(rng.random_uint(0), 0);
        assert_eq!(rng.random_uint(1), 0);
    }
}
