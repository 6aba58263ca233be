//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG with 64-bit state. Same seed → same sequence,
//! which is what makes two translation processes built from the same
//! configuration and fed the same snapshots produce bit-identical updates.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use stochastic_translation_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_f64();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// `RngManager::new(rng.get_state())` continues the exact sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Sample an exponential waiting time with the given total rate
    ///
    /// Uses `1 - u` so the logarithm argument lies in (0, 1].
    /// Returns `f64::INFINITY` when `rate` is not positive.
    ///
    /// # Example
    /// ```
    /// use stochastic_translation_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert!(rng.exponential(2.0) >= 0.0);
    /// assert!(rng.exponential(0.0).is_infinite());
    /// ```
    pub fn exponential(&mut self, rate: f64) -> f64 {
        if rate <= 0.0 {
            return f64::INFINITY;
        }
        let u = 1.0 - self.next_f64();
        -u.ln() / rate
    }

    /// Pick an index with probability proportional to its weight
    ///
    /// Returns `None` if no weight is positive. Non-positive weights are
    /// never selected.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if target < *weight {
                return Some(index);
            }
            target -= weight;
            last_positive = Some(index);
        }

        // Rounding can leave a sliver past the final bucket
        last_positive
    }
}
