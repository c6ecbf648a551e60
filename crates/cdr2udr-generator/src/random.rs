//! Randomness seam for the generator
//!
//! Every random draw the generator makes goes through [`RandomSource`], so
//! tests can replace it with a seeded or scripted source without touching
//! the algorithm.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the generator's random draws
pub trait RandomSource {
    /// Uniform integer in `[low, high)`; returns `low` when the range is empty
    fn range(&mut self, low: i64, high: i64) -> i64;

    /// Uniform index into a collection of `len` elements (`len > 0`)
    fn index(&mut self, len: usize) -> usize;

    /// Unbiased coin flip
    fn coin(&mut self) -> bool;
}

/// [`RandomSource`] backed by `rand`'s `StdRng`
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from the operating system
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible source for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, OS entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl RandomSource for StdRandom {
    fn range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}
