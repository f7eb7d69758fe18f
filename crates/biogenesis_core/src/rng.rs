//! Injectable random sources.
//!
//! Every random decision in the core (dataset values, IUCN draw, latency,
//! failure roll, loader steps) goes through [`RandomSource`], so tests can
//! replay exact draws instead of relying on probabilities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Uniform random draws.
pub trait RandomSource: Send {
    /// Returns a draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns an integer in `[0, upper)`; `0` when `upper == 0`.
    fn next_below(&mut self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        let scaled = (self.next_f64() * upper as f64) as u64;
        scaled.min(upper - 1)
    }

    /// Returns a value in `[low, high)`.
    fn next_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// `rand`-backed source used outside tests.
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seeds from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats `fallback` forever.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().map(clamp_unit).collect(),
            fallback: clamp_unit(fallback),
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(std::iter::empty(), value)
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

// Keeps scripted values inside the `[0, 1)` contract.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0 - f64::EPSILON)
}
