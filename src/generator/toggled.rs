//! Toggled Modulo: a mechanical move-and-hold cadence.

use super::{first_half, floor_to};
use crate::hash::FinalHash;
use crate::signal::HeldSignal;

/// Parameters for the Toggled Modulo generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggledModulo {
    /// Hold duration during the first half of each toggle cycle.
    pub period_a: i64,
    /// Hold duration during the second half.
    pub period_b: i64,
    /// Length of one full toggle cycle. Clamped to at least 1.
    pub period_switch: i64,
    /// Offset for the toggle clock.
    pub seed_inner: i64,
    /// Offset for the outer (anchor) clock.
    pub seed_outer: i64,
    /// Hash the anchor into `[0, 1)`; when off the raw anchor is returned.
    pub final_rand: bool,
    /// Which anchor hash revision to use.
    pub final_hash: FinalHash,
}

impl ToggledModulo {
    /// Parameters with final randomisation on.
    pub fn new(period_a: i64, period_b: i64, period_switch: i64, seed_inner: i64, seed_outer: i64) -> Self {
        Self {
            period_a,
            period_b,
            period_switch,
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
        let switch = self.period_switch.max(1);
        let inner_clock = self.seed_inner.saturating_add(frame);
        let duration = if first_half(inner_clock, switch) {
            self.period_a
        } else {
            self.period_b
        };
        duration.max(1)
    }

    /// Anchor of the hold containing `frame`.
    pub fn anchor(&self, frame: i64) -> i64 {
        floor_to(self.seed_outer.saturating_add(frame), self.hold_duration(frame))
    }
}

impl Default for ToggledModulo {
    fn default() -> Self {
        Self::new(10, 25, 30, 15, 0)
    }
}

impl HeldSignal for ToggledModulo {
    fn value_at(&self, frame: i64) -> f64 {
        let anchor = self.anchor(frame);
        if self.final_rand {
            self.final_hash.apply(anchor)
        } else {
            anchor as f64
        }
    }
}
