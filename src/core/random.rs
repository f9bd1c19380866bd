//! Injectable randomness for distractor sampling and option shuffling.

use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Source of the two random operations the quiz generator needs.
///
/// Production code uses [`ThreadRandom`]; tests use [`SeededRandom`] for
/// reproducible option orders.
pub trait RandomSource {
    /// Pick up to `amount` distinct indices from `0..len`, uniformly and
    /// without replacement.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;

    /// Uniformly shuffle `items` in place.
    fn shuffle(&mut self, items: &mut [String]);
}

fn sample_with<R: rand::Rng + ?Sized>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    rand::seq::index::sample(rng, len, amount.min(len)).into_vec()
}

/// Fresh randomness from the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRandom {
    rng: ThreadRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl RandomSource for ThreadRandom {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        sample_with(&mut self.rng, len, amount)
    }

    fn shuffle(&mut self, items: &mut [String]) {
        items.shuffle(&mut self.rng);
    }
}

/// Deterministic randomness from a fixed seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        sample_with(&mut self.rng, len, amount)
    }

    fn shuffle(&mut self, items: &mut [String]) {
        items.shuffle(&mut self.rng);
    }
}

/// A source that never randomizes: samples the first indices in order and
/// leaves slices untouched. Useful for asserting exact option layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShuffle;

impl RandomSource for NoShuffle {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..amount.min(len)).collect()
    }

    fn shuffle(&mut self, _items: &mut [String]) {}
}
