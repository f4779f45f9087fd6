//! Generator family: the closed set of held-signal algorithms.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod quantised;
mod stacked;
mod toggled;

pub use quantised::{QuantMode, QuantisedSwitching, QuantisedSwitchingBuilder, ResolvedTiming};
pub use stacked::StackedModulo;
pub use toggled::ToggledModulo;

use crate::output::DualStream;
use crate::signal::HeldSignal;

/// Largest multiple of `period` that is `<= clock`. `period` must be at least 1.
#[inline]
pub(crate) fn floor_to(clock: i64, period: i64) -> i64 {
    clock.div_euclid(period).saturating_mul(period)
}

/// True for the first half of each `period`-long cycle of `clock`.
#[inline]
pub(crate) fn first_half(clock: i64, period: i64) -> bool {
    let phase = clock.rem_euclid(period);
    phase < period - phase
}

/// Any of the three generators, bound to its parameters.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    /// Organic hold lengths from a reseeded random duration.
    StackedModulo(StackedModulo),
    /// Rhythmic hold lengths toggled between two periods.
    ToggledModulo(ToggledModulo),
    /// Switching between two quantised sine streams.
    QuantisedSwitching(QuantisedSwitching),
}

impl Generator {
    /// Short algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Generator::StackedModulo(_) => "StackedModulo",
            Generator::ToggledModulo(_) => "ToggledModulo",
            Generator::QuantisedSwitching(_) => "QuantisedSwitching",
        }
    }

    /// Whether the generator reports dual-stream state.
    pub fn is_dual_stream(&self) -> bool {
        matches!(self, Generator::QuantisedSwitching(_))
    }
}

impl HeldSignal for Generator {
    fn value_at(&self, frame: i64) -> f64 {
        match self {
            Generator::StackedModulo(g) => g.value_at(frame),
            Generator::ToggledModulo(g) => g.value_at(frame),
            Generator::QuantisedSwitching(g) => g.value_at(frame),
        }
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        match self {
            Generator::QuantisedSwitching(g) => g.streams_at(frame),
            _ => None,
        }
    }
}

impl From<StackedModulo> for Generator {
    fn from(g: StackedModulo) -> Self {
        Generator::StackedModulo(g)
    }
}

impl From<ToggledModulo> for Generator {
    fn from(g: ToggledModulo) -> Self {
        Generator::ToggledModulo(g)
    }
}

impl From<QuantisedSwitching> for Generator {
    fn from(g: QuantisedSwitching) -> Self {
        Generator::QuantisedSwitching(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_to_uses_floor_semantics() {
        assert_eq!(floor_to(23, 10), 20);
        assert_eq!(floor_to(20, 10), 20);
        assert_eq!(floor_to(-1, 10), -10);
        assert_eq!(floor_to(-10, 10), -10);
        assert_eq!(floor_to(7, 1), 7);
        assert_eq!(floor_to(i64::MIN, 3), i64::MIN);
    }

    #[test]
    fn first_half_matches_half_period_test() {
        // period 30: phases 0..15 are the first half
        assert!(first_half(0, 30));
        assert!(first_half(14, 30));
        assert!(!first_half(15, 30));
        assert!(!first_half(29, 30));
        // odd period 5: 0,1,2 < 2.5
        assert!(first_half(2, 5));
        assert!(!first_half(3, 5));
        assert!(!first_half(0, 1));
        assert!(first_half(-30, 30));
    }

    #[test]
    fn enum_dispatches_to_variant() {
        let sm = StackedModulo::default();
        let g = Generator::from(sm);
        for f in 0..50 {
            assert_eq!(g.value_at(f).to_bits(), sm.value_at(f).to_bits());
        }
        assert_eq!(g.name(), "StackedModulo");
        assert!(g.streams_at(3).is_none());

        let qs = Generator::from(QuantisedSwitching::default());
        assert!(qs.is_dual_stream());
        assert!(qs.streams_at(3).is_some());
    }
}
