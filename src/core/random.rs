//! Random sources for send outcomes
//!
//! Send outcomes are the only nondeterminism in a simulation. Everything
//! random flows through a [`RandomSource`], so a seed reproduces a run and
//! tests can pin the outcome.

use super::traits::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source backed by a seedable PRNG
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: StdRng,
}

impl SeededRandom {
    /// Deterministic stream for the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    /// Roll a float in [0.0, 1.0) and compare it against `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.inner.gen::<f64>() < probability
    }
}

/// Random source that always returns the same outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOutcome(pub bool);

impl FixedOutcome {
    pub fn always_succeed() -> Self {
        FixedOutcome(true)
    }

    pub fn always_fail() -> Self {
        FixedOutcome(false)
    }
}

impl RandomSource for FixedOutcome {
    fn chance(&mut self, _probability: f64) -> bool {
        self.0
    }
}
