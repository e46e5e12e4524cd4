//! Seedable randomness for blob generation.
//!
//! Blob creation draws positions, radii, phases and opacities from a
//! [`RandomSource`]. The default source is [`Xorshift64`], so a simulator
//! built from the same seed and settings regenerates the same blob set.

use serde::{Deserialize, Serialize};

/// A stream of uniform samples in `[0, 1)`.
///
/// Object-safe so the blob pool can hold `Box<dyn RandomSource>` and tests
/// can substitute a scripted sequence.
pub trait RandomSource {
    /// Returns the next uniformly distributed value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns a uniformly distributed value in `[min, max)`.
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

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

    /// Creates a new PRNG with the given seed.
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
}

impl RandomSource for Xorshift64 {
    /// Upper 53 bits of `next_u64()` divided by 2^53.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// Used where exact blob placement matters (tests, frozen exports).
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Creates a source that yields `samples` in order, clamped into `[0, 1)`.
    /// An empty list yields `0.0` forever.
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let v = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every saved snapshot regenerates different blobs.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64::new(7);
        let mut b = Xorshift64::new(7);
        for i in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at {i}");
        }
    }

    #[test]
    fn next_f64_always_in_unit_interval() {
        let mut rng = Xorshift64::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "{v} out of [0, 1)");
        }
    }

    #[test]
    fn scripted_source_cycles_and_clamps() {
        let mut src = ScriptedSource::new(vec![0.25, 1.5]);
        assert_eq!(src.next_f64(), 0.25);
        assert!(src.next_f64() < 1.0);
        assert_eq!(src.next_f64(), 0.25);
    }

    #[test]
    fn scripted_source_empty_yields_zero() {
        let mut src = ScriptedSource::new(Vec::new());
        assert_eq!(src.next_f64(), 0.0);
        assert_eq!(src.next_range(200.0, 600.0), 200.0);
    }

    #[test]
    fn random_source_is_object_safe() {
        let mut boxed: Box<dyn RandomSource> = Box::new(Xorshift64::new(3));
        let v = boxed.next_range(10.0, 20.0);
        assert!((10.0..20.0).contains(&v));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_range_in_bounds_for_any_seed_and_range(
                seed: u64,
                min in -1e3_f64..1e3,
                span in 1.0_f64..1e3,
            ) {
                let mut rng = Xorshift64::new(seed);
                let max = min + span;
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "{v} outside [{min}, {max})");
                }
            }
        }
    }
}
