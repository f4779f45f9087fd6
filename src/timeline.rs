//! Caller timeline: time multiplier and the integer tick lattice searches run on.
//!
//! A caller frame `f` sits at tick `round(f * inflation)`. The generator sees
//! `floor(tick / inflation * multiplier)`. The mapping from tick to generator
//! frame is monotone for any multiplier (non-increasing when it is negative),
//! which is all the boundary search needs. The inflation factor only has to be
//! fine enough that no two caller frames a host can produce share a tick.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Default ticks per caller frame.
pub const DEFAULT_INFLATION: i64 = 100_000_000;

/// Errors from the strict [`Timeline`] constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Inflation factor below one tick per frame.
    #[error("inflation factor must be at least 1, got {0}")]
    InvalidInflation(i64),
    /// Time multiplier is NaN or infinite.
    #[error("time multiplier must be finite")]
    NonFiniteMultiplier,
}

/// Maps caller frames onto ticks and ticks onto generator frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    multiplier: f64,
    inflation: i64,
}

impl Timeline {
    /// Timeline with the default inflation. Non-finite multipliers clamp to `1.0`.
    pub fn new(multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() { multiplier } else { 1.0 };
        Self {
            multiplier,
            inflation: DEFAULT_INFLATION,
        }
    }

    /// Timeline with the default inflation, rejecting non-finite multipliers.
    pub fn try_new(multiplier: f64) -> Result<Self, TimelineError> {
        Self::with_inflation(multiplier, DEFAULT_INFLATION)
    }

    /// Timeline with an explicit inflation factor.
    pub fn with_inflation(multiplier: f64, inflation: i64) -> Result<Self, TimelineError> {
        if !multiplier.is_finite() {
            return Err(TimelineError::NonFiniteMultiplier);
        }
        if inflation < 1 {
            return Err(TimelineError::InvalidInflation(inflation));
        }
        Ok(Self {
            multiplier,
            inflation,
        })
    }

    /// Generator frames per caller frame.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Ticks per caller frame.
    pub fn inflation(&self) -> i64 {
        self.inflation
    }

    /// Nearest tick to a caller frame.
    #[inline]
    pub fn inflate(&self, frame: f64) -> i64 {
        libm::round(frame * self.inflation as f64) as i64
    }

    /// Caller frame of a tick.
    #[inline]
    pub fn deflate(&self, tick: i64) -> f64 {
        tick as f64 / self.inflation as f64
    }

    /// Position of a tick on the scaled (generator) timeline, before flooring.
    #[inline]
    pub fn scaled_position(&self, tick: i64) -> f64 {
        self.deflate(tick) * self.multiplier
    }

    /// Whole generator frame a tick falls on.
    #[inline]
    pub fn generator_frame(&self, tick: i64) -> i64 {
        libm::floor(self.scaled_position(tick)) as i64
    }

    /// First tick in `(after, until]` whose generator frame has reached `frame`,
    /// reading "reached" in the direction the multiplier runs the generator.
    ///
    /// `until` must have reached `frame` and `after` must not have; the result
    /// is then the tick where the generator first enters `frame`.
    pub fn first_tick_reaching(&self, frame: i64, after: i64, until: i64) -> i64 {
        let reached = |tick: i64| {
            let g = self.generator_frame(tick);
            if self.multiplier < 0.0 {
                g <= frame
            } else {
                g >= frame
            }
        };
        let (mut lo, mut hi) = (after, until);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if reached(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }

    /// Ticks spanned by `frames` caller frames, saturating.
    #[inline]
    pub fn span(&self, frames: u32) -> i64 {
        (frames as i64).saturating_mul(self.inflation)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(1.0)
    }
}
