//! Deterministic PRNG based on the Xorshift64 algorithm.
//!
//! The engine never touches a global generator. Every consumer of randomness
//! (the noise lattice hash seed, per-frame velocity jitter, respawn
//! placement) owns its own `Xorshift64`, derived from one master seed with
//! [`Xorshift64::fork`].

use serde::{Deserialize, Serialize};

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is replaced with
/// a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed (0 maps to a fixed fallback).
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns the next value truncated to 32 bits (upper half of the state).
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Returns a uniformly distributed f32 in [0, 1).
    ///
    /// Uses the upper 24 bits so every result is exactly representable.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }

    /// Returns a uniformly distributed f32 in [min, max).
    ///
    /// Returns `min` when the interval is empty or inverted.
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        let v = min + self.next_f32() * (max - min);
        // Rounding can land exactly on `max` for wide intervals.
        if v >= max {
            min
        } else {
            v
        }
    }

    /// Derives an independent generator from this one.
    ///
    /// The child seed is the next output passed through a splitmix64
    /// finalizer, so parent and child sequences do not overlap in practice.
    pub fn fork(&mut self) -> Self {
        let mut z = self.next_u64().wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }
}
