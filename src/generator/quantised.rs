//! Quantised Switching: two stepped sine streams with a switch between them.

use super::{first_half, floor_to};
use crate::hash::portable_rand;
use crate::output::{ActiveStream, DualStream};
use crate::signal::HeldSignal;
use crate::sine::{sine, SinePrecision};

/// Stream-2 frequency multiplier used when none (or a non-positive one) is given.
pub const DEFAULT_STREAM2_FREQ_MULT: f64 = 3.7;
/// Default stream-switch duration, as a fraction of the base wave period.
pub const SWITCH_PERIOD_RATIO: f64 = 0.76;
/// Default stream-1 quantisation duration, as a fraction of the base wave period.
pub const STREAM1_QUANT_PERIOD_RATIO: f64 = 1.2;
/// Default stream-2 quantisation duration, as a fraction of the base wave period.
pub const STREAM2_QUANT_PERIOD_RATIO: f64 = 0.9;
/// Stream-2 level multiplier applied to `quant_min` in alternating mode.
pub const STREAM2_QUANT_RATIO_MIN: f64 = 1.24;
/// Stream-2 level multiplier applied to `quant_max` in alternating mode.
pub const STREAM2_QUANT_RATIO_MAX: f64 = 0.66;

/// How each stream picks its quantisation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantMode {
    /// Alternate between min and max on a 50% duty cycle of the stream's quant duration.
    Alternating,
    /// Draw a level from `[min, max]` once per quant duration, clocked by `offsets[k] + frame`.
    Hashed {
        /// Clock offsets for the stream 1 and stream 2 draws.
        offsets: [i64; 2],
    },
}

/// Parameters for the Quantised Switching generator.
///
/// Optional durations fall back to fractions of the base wave period
/// (`1 / base_wave_freq`): 0.76 for the stream switch, 1.2 and 0.9 for the two
/// quantisation durations. Values below one frame count as unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantisedSwitching {
    /// Angular frequency of stream 1, radians per frame.
    pub base_wave_freq: f64,
    /// Stream 2 frequency relative to stream 1.
    pub stream2_freq_mult: Option<f64>,
    /// `[min, max]` quantisation levels.
    pub quant_levels: [i64; 2],
    /// Frame offsets of the two sine streams.
    pub stream_offsets: [i64; 2],
    /// Level selection strategy.
    pub quant_mode: QuantMode,
    /// Frames per full stream-switch cycle.
    pub stream_switch_dur: Option<i64>,
    /// Frames per stream 1 quantisation cycle.
    pub stream1_quant_dur: Option<i64>,
    /// Frames per stream 2 quantisation cycle.
    pub stream2_quant_dur: Option<i64>,
    /// Hash the active stream into `[0, 1)`; when off it is rescaled to `[0, 1]`.
    pub final_rand: bool,
    /// Sine strategy for the two waveforms.
    pub precision: SinePrecision,
}

/// Durations and multiplier after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTiming {
    /// Frames per stream-switch cycle, at least 1.
    pub stream_switch_dur: i64,
    /// Frames per stream 1 quantisation cycle, at least 1.
    pub stream1_quant_dur: i64,
    /// Frames per stream 2 quantisation cycle, at least 1.
    pub stream2_quant_dur: i64,
    /// Positive stream 2 frequency multiplier.
    pub stream2_freq_mult: f64,
}

fn duration_or_derived(explicit: Option<i64>, base_wave_freq: f64, ratio: f64) -> i64 {
    let explicit = explicit.filter(|d| *d >= 1);
    let duration = explicit.unwrap_or_else(|| libm::floor((1.0 / base_wave_freq) * ratio) as i64);
    duration.max(1)
}

impl QuantisedSwitching {
    /// Start a builder seeded with [`Default`] parameters.
    pub fn builder() -> QuantisedSwitchingBuilder {
        QuantisedSwitchingBuilder::new()
    }

    /// Apply default derivations and clamps.
    pub fn resolve(&self) -> ResolvedTiming {
        let freq = self.base_wave_freq;
        ResolvedTiming {
            stream_switch_dur: duration_or_derived(self.stream_switch_dur, freq, SWITCH_PERIOD_RATIO),
            stream1_quant_dur: duration_or_derived(self.stream1_quant_dur, freq, STREAM1_QUANT_PERIOD_RATIO),
            stream2_quant_dur: duration_or_derived(self.stream2_quant_dur, freq, STREAM2_QUANT_PERIOD_RATIO),
            stream2_freq_mult: self
                .stream2_freq_mult
                .filter(|m| *m > 0.0)
                .unwrap_or(DEFAULT_STREAM2_FREQ_MULT),
        }
    }

    /// Quantisation levels of both streams at `frame`, each at least 1.
    pub fn quant_levels_at(&self, frame: i64, timing: &ResolvedTiming) -> [i64; 2] {
        let [quant_min, quant_max] = self.quant_levels;
        let levels = match self.quant_mode {
            QuantMode::Alternating => {
                let s1 = if first_half(self.stream_offsets[0].saturating_add(frame), timing.stream1_quant_dur) {
                    quant_min
                } else {
                    quant_max
                };
                let s2 = if first_half(self.stream_offsets[1].saturating_add(frame), timing.stream2_quant_dur) {
                    libm::floor(quant_min as f64 * STREAM2_QUANT_RATIO_MIN) as i64
                } else {
                    libm::floor(quant_max as f64 * STREAM2_QUANT_RATIO_MAX) as i64
                };
                [s1, s2]
            }
            QuantMode::Hashed { offsets } => {
                let range = quant_max.saturating_sub(quant_min).saturating_add(1).max(1);
                let draw = |offset: i64, duration: i64| {
                    let seed = floor_to(offset.saturating_add(frame), duration);
                    quant_min.saturating_add(libm::floor(portable_rand(seed) * range as f64) as i64)
                };
                [
                    draw(offsets[0], timing.stream1_quant_dur),
                    draw(offsets[1], timing.stream2_quant_dur),
                ]
            }
        };
        levels.map(|l| l.max(1))
    }

    /// Both stream values and the selected stream at `frame`.
    pub fn streams(&self, frame: i64) -> DualStream {
        let timing = self.resolve();
        let [level1, level2] = self.quant_levels_at(frame, &timing);

        let phase1 = self.stream_offsets[0].saturating_add(frame) as f64 * self.base_wave_freq;
        let phase2 = self.stream_offsets[1].saturating_add(frame) as f64
            * self.base_wave_freq
            * timing.stream2_freq_mult;
        let stream1 = quantise(sine(phase1, self.precision), level1);
        let stream2 = quantise(sine(phase2, self.precision), level2);

        let switch = timing.stream_switch_dur;
        let active = if frame.rem_euclid(switch) < switch / 2 {
            ActiveStream::First
        } else {
            ActiveStream::Second
        };
        DualStream {
            stream1,
            stream2,
            active,
        }
    }
}

/// Floor a `[-1, 1]` sample onto `level` steps per unit.
#[inline]
fn quantise(sample: f64, level: i64) -> f64 {
    let level = level as f64;
    libm::floor(sample * level) / level
}

impl Default for QuantisedSwitching {
    fn default() -> Self {
        Self {
            base_wave_freq: 0.012,
            stream2_freq_mult: Some(3.1),
            quant_levels: [4, 12],
            stream_offsets: [0, 76],
            quant_mode: QuantMode::Hashed { offsets: [10, 81] },
            stream_switch_dur: Some(24),
            stream1_quant_dur: Some(16),
            stream2_quant_dur: Some(20),
            final_rand: true,
            precision: SinePrecision::Direct,
        }
    }
}

impl HeldSignal for QuantisedSwitching {
    fn value_at(&self, frame: i64) -> f64 {
        let active = self.streams(frame).active_value();
        if self.final_rand {
            portable_rand((active * 100_000.0) as i64)
        } else {
            0.5 * active + 0.5
        }
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        Some(self.streams(frame))
    }
}

/// Builder for [`QuantisedSwitching`].
#[derive(Debug, Clone)]
pub struct QuantisedSwitchingBuilder {
    params: QuantisedSwitching,
}

impl QuantisedSwitchingBuilder {
    /// Builder seeded with [`QuantisedSwitching::default`].
    pub fn new() -> Self {
        Self {
            params: QuantisedSwitching::default(),
        }
    }

    /// Stream 1 angular frequency.
    pub fn base_wave_freq(mut self, freq: f64) -> Self {
        self.params.base_wave_freq = freq;
        self
    }

    /// Stream 2 frequency multiplier; `None` uses 3.7.
    pub fn stream2_freq_mult(mut self, mult: Option<f64>) -> Self {
        self.params.stream2_freq_mult = mult;
        self
    }

    /// Quantisation level range.
    pub fn quant_levels(mut self, min: i64, max: i64) -> Self {
        self.params.quant_levels = [min, max];
        self
    }

    /// Frame offsets of the two sine streams.
    pub fn stream_offsets(mut self, stream1: i64, stream2: i64) -> Self {
        self.params.stream_offsets = [stream1, stream2];
        self
    }

    /// Level selection strategy.
    pub fn quant_mode(mut self, mode: QuantMode) -> Self {
        self.params.quant_mode = mode;
        self
    }

    /// Stream-switch cycle; `None` derives it from the frequency.
    pub fn stream_switch_dur(mut self, frames: Option<i64>) -> Self {
        self.params.stream_switch_dur = frames;
        self
    }

    /// Stream 1 quantisation cycle; `None` derives it from the frequency.
    pub fn stream1_quant_dur(mut self, frames: Option<i64>) -> Self {
        self.params.stream1_quant_dur = frames;
        self
    }

    /// Stream 2 quantisation cycle; `None` derives it from the frequency.
    pub fn stream2_quant_dur(mut self, frames: Option<i64>) -> Self {
        self.params.stream2_quant_dur = frames;
        self
    }

    /// Clear every optional timing field so all defaults are derived from the frequency.
    pub fn derived_timing(mut self) -> Self {
        self.params.stream_switch_dur = None;
        self.params.stream1_quant_dur = None;
        self.params.stream2_quant_dur = None;
        self.params.stream2_freq_mult = None;
        self
    }

    /// Toggle the final randomisation step.
    pub fn final_rand(mut self, on: bool) -> Self {
        self.params.final_rand = on;
        self
    }

    /// Sine strategy for the waveforms.
    pub fn precision(mut self, precision: SinePrecision) -> Self {
        self.params.precision = precision;
        self
    }

    /// Finish. Never fails: degenerate values are clamped when evaluated.
    pub fn build(self) -> QuantisedSwitching {
        self.params
    }
}

impl Default for QuantisedSwitchingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_timing_follows_wave_period() {
        let qs = QuantisedSwitching::builder()
            .base_wave_freq(0.012)
            .derived_timing()
            .build();
        let t = qs.resolve();
        // period 83.33 frames; 1.2x lands a hair under 100
        assert_eq!(t.stream_switch_dur, 63);
        assert_eq!(t.stream1_quant_dur, 99);
        assert_eq!(t.stream2_quant_dur, 75);
        assert_eq!(t.stream2_freq_mult, DEFAULT_STREAM2_FREQ_MULT);
    }

    #[test]
    fn non_positive_overrides_fall_back() {
        let qs = QuantisedSwitching::builder()
            .base_wave_freq(0.012)
            .stream_switch_dur(Some(0))
            .stream1_quant_dur(Some(-5))
            .stream2_quant_dur(None)
            .stream2_freq_mult(Some(-1.0))
            .build();
        let t = qs.resolve();
        assert_eq!(t.stream_switch_dur, 63);
        assert_eq!(t.stream1_quant_dur, 99);
        assert_eq!(t.stream2_quant_dur, 75);
        assert_eq!(t.stream2_freq_mult, 3.7);
    }

    #[test]
    fn high_frequency_durations_clamp_to_one() {
        let qs = QuantisedSwitching::builder().base_wave_freq(5.0).derived_timing().build();
        let t = qs.resolve();
        assert_eq!(t.stream_switch_dur, 1);
        assert_eq!(t.stream1_quant_dur, 1);
        assert_eq!(t.stream2_quant_dur, 1);
    }

    #[test]
    fn hashed_levels_stay_in_range() {
        let qs = QuantisedSwitching::default();
        let t = qs.resolve();
        for f in -300..300 {
            for level in qs.quant_levels_at(f, &t) {
                assert!((4..=12).contains(&level), "frame {} level {}", f, level);
            }
        }
    }

    #[test]
    fn inverted_or_zero_levels_clamp() {
        let qs = QuantisedSwitching::builder().quant_levels(0, -6).build();
        let t = qs.resolve();
        for f in 0..50 {
            assert_eq!(qs.quant_levels_at(f, &t), [1, 1]);
        }
    }

    #[test]
    fn alternating_levels_follow_duty_cycle() {
        let qs = QuantisedSwitching::builder()
            .quant_mode(QuantMode::Alternating)
            .quant_levels(12, 22)
            .stream_offsets(0, 0)
            .stream1_quant_dur(Some(16))
            .stream2_quant_dur(Some(20))
            .build();
        let t = qs.resolve();
        assert_eq!(qs.quant_levels_at(0, &t), [12, 14]);
        assert_eq!(qs.quant_levels_at(7, &t), [12, 14]);
        assert_eq!(qs.quant_levels_at(8, &t), [22, 14]);
        assert_eq!(qs.quant_levels_at(10, &t), [22, 14]);
        assert_eq!(qs.quant_levels_at(12, &t), [22, 14]);
        assert_eq!(qs.quant_levels_at(15, &t), [22, 14]);
        assert_eq!(qs.quant_levels_at(16, &t), [12, 14]);
        // floor(22 * 0.66) == floor(12 * 1.24), so use levels that tell the halves apart
        let qs = QuantisedSwitching::builder()
            .quant_mode(QuantMode::Alternating)
            .quant_levels(10, 30)
            .stream_offsets(0, 0)
            .stream1_quant_dur(Some(16))
            .stream2_quant_dur(Some(20))
            .build();
        let t = qs.resolve();
        assert_eq!(qs.quant_levels_at(0, &t), [10, 12]);
        assert_eq!(qs.quant_levels_at(10, &t), [30, 19]);
    }

    #[test]
    fn streams_are_quantised_and_bounded() {
        let qs = QuantisedSwitching::default();
        for f in -200..400 {
            let s = qs.streams(f);
            for v in [s.stream1, s.stream2] {
                assert!((-1.0..=1.0).contains(&v));
                // a multiple of 1/level for some level in 4..=12
                assert!((4..=12).any(|l| ((v * l as f64) - (v * l as f64).round()).abs() < 1e-9));
            }
        }
    }

    #[test]
    fn switch_uses_integer_half() {
        let qs = QuantisedSwitching::builder().stream_switch_dur(Some(5)).build();
        assert_eq!(qs.streams(0).active, ActiveStream::First);
        assert_eq!(qs.streams(1).active, ActiveStream::First);
        assert_eq!(qs.streams(2).active, ActiveStream::Second);
        assert_eq!(qs.streams(4).active, ActiveStream::Second);
        assert_eq!(qs.streams(5).active, ActiveStream::First);
    }

    #[test]
    fn output_ranges() {
        let hashed = QuantisedSwitching::builder().quant_levels(4, 12).base_wave_freq(0.012).derived_timing().build();
        let raw = QuantisedSwitching::builder()
            .quant_levels(4, 12)
            .base_wave_freq(0.012)
            .derived_timing()
            .final_rand(false)
            .build();
        for f in 0..1000 {
            let v = hashed.value_at(f);
            assert!((0.0..1.0).contains(&v));
            let r = raw.value_at(f);
            assert!((0.0..=1.0).contains(&r));
            assert_eq!(r, 0.5 * raw.streams(f).active_value() + 0.5);
        }
    }

    #[test]
    fn quant_draws_ignore_sine_precision() {
        let direct = QuantisedSwitching::default();
        let coarse = QuantisedSwitching::builder().precision(SinePrecision::Table100).build();
        // identical quantisation draws: the hash never goes through a table
        let t = direct.resolve();
        for f in 0..200 {
            assert_eq!(direct.quant_levels_at(f, &t), coarse.quant_levels_at(f, &t));
        }
    }
}
