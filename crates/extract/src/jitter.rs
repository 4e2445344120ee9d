//! Random offsets for approximate heuristic results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of small coordinate offsets.
pub trait JitterSource: Send + Sync {
    /// Offset in `[-max, max]` degrees. Zero when `max` is not positive.
    fn offset(&self, max: f64) -> f64;
}

/// Thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn offset(&self, max: f64) -> f64 {
        if max <= 0.0 || !max.is_finite() {
            return 0.0;
        }
        rand::thread_rng().gen_range(-max..=max)
    }
}

/// Reproducible offsets from a fixed seed.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    /// Seeded generator.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&self, max: f64) -> f64 {
        if max <= 0.0 || !max.is_finite() {
            return 0.0;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(-max..=max),
            Err(_) => 0.0,
        }
    }
}

/// Always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&self, _max: f64) -> f64 {
        0.0
    }
}
