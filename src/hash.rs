//! Deterministic hash: integer seed → float in `[0, 1)`.

#![forbid(unsafe_code)]

use std::f64::consts::TAU;

/// Multiplier applied to the seed before the sine.
pub const SEED_SCALE: f64 = 12.9898;

/// Multiplier applied to the sine before taking the fractional part.
pub const SINE_SCALE: f64 = 43758.5453;

/// Seed scale used by [`FinalHash::Scaled`].
pub const FINAL_SEED_SCALE: i64 = 100_000;

/// Portable hash of an integer seed.
///
/// The scaled seed is reduced modulo 2π before the sine is taken. Without the
/// reduction large seeds lose precision inside the trig routine and the output
/// sticks to a handful of values. The sine itself always goes through `libm`,
/// never through a lookup table, so every caller sees the same hash regardless
/// of the [`SinePrecision`](crate::sine::SinePrecision) it uses for waveforms.
#[inline]
pub fn portable_rand(seed: i64) -> f64 {
    let mut phase = (seed as f64 * SEED_SCALE) % TAU;
    if phase < 0.0 {
        phase += TAU;
    }
    let result = libm::sin(phase) * SINE_SCALE;
    let frac = result - libm::floor(result);
    // `result - floor(result)` can round up to exactly 1.0 for tiny negatives.
    if frac >= 1.0 {
        0.0
    } else {
        frac
    }
}

/// How a held anchor is turned into the final value when final randomisation is on.
///
/// The two published revisions of the modulo generators disagree here, and both
/// are kept so output can be matched bit-for-bit against either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FinalHash {
    /// Hash `anchor * 100000`.
    #[default]
    Scaled,
    /// Hash the anchor as-is.
    Plain,
}

impl FinalHash {
    /// Hash a held anchor according to this revision.
    #[inline]
    pub fn apply(self, anchor: i64) -> f64 {
        match self {
            FinalHash::Scaled => portable_rand(anchor.saturating_mul(FINAL_SEED_SCALE)),
            FinalHash::Plain => portable_rand(anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_in_unit_interval() {
        for seed in -10_000..10_000 {
            let v = portable_rand(seed);
            assert!((0.0..1.0).contains(&v), "seed {} -> {}", seed, v);
        }
    }

    #[test]
    fn hash_is_pure() {
        for seed in [0, 1, -1, 42, i64::MAX, i64::MIN, 1 << 40] {
            assert_eq!(portable_rand(seed).to_bits(), portable_rand(seed).to_bits());
        }
    }

    #[test]
    fn hash_does_not_stick_for_large_seeds() {
        let base = 9_000_000_000_000i64;
        let mut distinct = std::collections::HashSet::new();
        for i in 0..64 {
            distinct.insert(portable_rand(base + i).to_bits());
        }
        assert!(distinct.len() > 32, "only {} distinct values", distinct.len());
    }

    #[test]
    fn zero_seed_hashes_to_zero() {
        assert_eq!(portable_rand(0), 0.0);
    }

    #[test]
    fn final_hash_revisions_differ() {
        assert_eq!(FinalHash::Plain.apply(100), portable_rand(100));
        assert_eq!(FinalHash::Scaled.apply(100), portable_rand(10_000_000));
        assert_ne!(FinalHash::Plain.apply(100), FinalHash::Scaled.apply(100));
    }
}
