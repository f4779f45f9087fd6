//! Stacked Modulo: organically varying hold lengths.

use super::floor_to;
use crate::hash::{portable_rand, FinalHash};
use crate::signal::HeldSignal;

/// Parameters for the Stacked Modulo generator.
///
/// A reseed clock picks a hold duration between `min_hold` and `max_hold`; the
/// outer clock is then floored to that duration, giving an anchor that stays
/// fixed for the whole hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedModulo {
    /// Shortest hold, in frames.
    pub min_hold: i64,
    /// Longest hold, in frames.
    pub max_hold: i64,
    /// How often a new hold duration is drawn. Clamped to at least 1.
    pub reseed_interval: i64,
    /// Offset for the duration draw.
    pub seed_inner: i64,
    /// Offset for the outer (anchor) clock.
    pub seed_outer: i64,
    /// Hash the anchor into `[0, 1)`; when off the raw anchor is returned.
    pub final_rand: bool,
    /// Which anchor hash revision to use.
    pub final_hash: FinalHash,
}

impl StackedModulo {
    /// Parameters with final randomisation on.
    pub fn new(min_hold: i64, max_hold: i64, reseed_interval: i64, seed_inner: i64, seed_outer: i64) -> Self {
        Self {
            min_hold,
            max_hold,
            reseed_interval,
            seed_inner,
            seed_outer,
            final_rand: true,
            final_hash: FinalHash::default(),
        }
    }

    /// Toggle the final randomisation step.
    pub fn with_final_rand(mut self, on: bool) -> Self {
        self.final_rand = on;
        self
    }

    /// Select the anchor hash revision.
    pub fn with_final_hash(mut self, final_hash: FinalHash) -> Self {
        self.final_hash = final_hash;
        self
    }

    /// Hold duration in force at `frame`, at least 1.
    pub fn hold_duration(&self, frame: i64) -> i64 {
        let reseed = self.reseed_interval.max(1);
        let reseed_anchor = floor_to(frame, reseed).saturating_add(self.seed_inner);
        let r = portable_rand(reseed_anchor);
        let span = self.max_hold as f64 - self.min_hold as f64;
        let duration = libm::floor(self.min_hold as f64 + r * span) as i64;
        duration.max(1)
    }

    /// Anchor of the hold containing `frame`.
    pub fn anchor(&self, frame: i64) -> i64 {
        floor_to(self.seed_outer.saturating_add(frame), self.hold_duration(frame))
    }
}

impl Default for StackedModulo {
    fn default() -> Self {
        Self::new(16, 24, 9, -41, 23)
    }
}

impl HeldSignal for StackedModulo {
    fn value_at(&self, frame: i64) -> f64 {
        let anchor = self.anchor(frame);
        if self.final_rand {
            self.final_hash.apply(anchor)
        } else {
            anchor as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_duration_within_range() {
        let sm = StackedModulo::default();
        for f in -500..500 {
            let d = sm.hold_duration(f);
            assert!((16..24).contains(&d), "frame {} duration {}", f, d);
        }
    }

    #[test]
    fn duration_constant_within_reseed_interval() {
        let sm = StackedModulo::default();
        for start in (0..270).step_by(9) {
            let d = sm.hold_duration(start);
            for f in start..start + 9 {
                assert_eq!(sm.hold_duration(f), d);
            }
        }
    }

    #[test]
    fn reseed_zero_behaves_like_one() {
        let a = StackedModulo::new(3, 11, 0, 5, 2);
        let b = StackedModulo::new(3, 11, 1, 5, 2);
        let c = StackedModulo::new(3, 11, -7, 5, 2);
        for f in -100..100 {
            assert_eq!(a.value_at(f).to_bits(), b.value_at(f).to_bits());
            assert_eq!(c.value_at(f).to_bits(), b.value_at(f).to_bits());
        }
    }

    #[test]
    fn degenerate_holds_clamp_to_one_frame() {
        let sm = StackedModulo::new(0, 0, 4, 0, 0).with_final_rand(false);
        for f in -20..20 {
            assert_eq!(sm.hold_duration(f), 1);
            assert_eq!(sm.value_at(f), f as f64);
        }
        let negative = StackedModulo::new(-10, -3, 4, 0, 0);
        assert_eq!(negative.hold_duration(17), 1);
    }

    #[test]
    fn raw_anchor_is_a_frame_at_or_before_the_clock() {
        let sm = StackedModulo::default().with_final_rand(false);
        for f in 0..300 {
            let anchor = sm.value_at(f) as i64;
            let clock = f + sm.seed_outer;
            assert!(anchor <= clock && clock - anchor < 24);
        }
    }

    #[test]
    fn final_value_is_hash_of_anchor() {
        let sm = StackedModulo::default();
        let plain = sm.with_final_hash(FinalHash::Plain);
        for f in 0..100 {
            let anchor = sm.anchor(f);
            assert_eq!(sm.value_at(f), portable_rand(anchor * 100_000));
            assert_eq!(plain.value_at(f), portable_rand(anchor));
            assert!((0.0..1.0).contains(&sm.value_at(f)));
        }
    }
}
