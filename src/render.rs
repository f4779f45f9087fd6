//! Offline rendering: evaluate a signal over a range of frames.

#![forbid(unsafe_code)]

use crate::signal::{same_value, HeldSignal};
use crate::timeline::Timeline;

/// One run of identical values on the generator timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldSpan {
    /// First generator frame of the hold.
    pub start: i64,
    /// First generator frame after the hold.
    pub end: i64,
    /// Value held throughout the span.
    pub value: f64,
}

impl HoldSpan {
    /// Length in generator frames.
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    /// Spans from [`hold_spans`] are never empty.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Render `frames` consecutive caller frames starting at `start_frame`.
pub fn render_values<S>(signal: &S, timeline: &Timeline, start_frame: f64, frames: usize) -> Vec<f64>
where
    S: HeldSignal + ?Sized,
{
    let mut output = Vec::with_capacity(frames);
    for i in 0..frames {
        let tick = timeline.inflate(start_frame + i as f64);
        output.push(signal.value_at(timeline.generator_frame(tick)));
    }
    output
}

/// Group generator frames `start..end` into holds by linear scan.
///
/// The first and last spans are cut at the range ends. Empty for an empty range.
pub fn hold_spans<S>(signal: &S, start: i64, end: i64) -> Vec<HoldSpan>
where
    S: HeldSignal + ?Sized,
{
    let mut spans = Vec::new();
    if end <= start {
        return spans;
    }
    let mut current = HoldSpan {
        start,
        end: start + 1,
        value: signal.value_at(start),
    };
    for frame in start + 1..end {
        let value = signal.value_at(frame);
        if same_value(value, current.value) {
            current.end = frame + 1;
        } else {
            spans.push(current);
            current = HoldSpan {
                start: frame,
                end: frame + 1,
                value,
            };
        }
    }
    spans.push(current);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::FnSignal;

    #[test]
    fn render_follows_the_timeline() {
        let signal = FnSignal(|f: i64| f as f64);
        let out = render_values(&signal, &Timeline::new(0.5), 0.0, 6);
        assert_eq!(out, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let out = render_values(&signal, &Timeline::default(), -2.0, 3);
        assert_eq!(out, vec![-2.0, -1.0, 0.0]);
    }

    #[test]
    fn spans_cover_the_range() {
        let signal = FnSignal(|f: i64| f.div_euclid(4) as f64);
        let spans = hold_spans(&signal, 2, 13);
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0], HoldSpan { start: 2, end: 4, value: 0.0 });
        assert_eq!(spans[3], HoldSpan { start: 12, end: 13, value: 3.0 });
        assert_eq!(spans.iter().map(HoldSpan::len).sum::<i64>(), 11);
    }

    #[test]
    fn empty_range_has_no_spans() {
        let signal = FnSignal(|_f: i64| 1.0);
        assert!(hold_spans(&signal, 5, 5).is_empty());
        assert!(hold_spans(&signal, 5, 1).is_empty());
    }
}
