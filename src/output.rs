//! Query results: level of detail and the held-value output record.

#![forbid(unsafe_code)]

/// How much metadata a query computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Lod {
    /// Current value only.
    Value,
    /// Value plus the changed-from-previous-frame flag.
    Changed,
    /// Everything, including the boundary search.
    #[default]
    Full,
}

impl Lod {
    /// Numeric level, 0..=2.
    pub const fn level(self) -> u8 {
        match self {
            Lod::Value => 0,
            Lod::Changed => 1,
            Lod::Full => 2,
        }
    }
}

impl From<u8> for Lod {
    /// Levels above 2 clamp to [`Lod::Full`].
    fn from(level: u8) -> Self {
        match level {
            0 => Lod::Value,
            1 => Lod::Changed,
            _ => Lod::Full,
        }
    }
}

/// Which of the two quantised streams drives the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveStream {
    #[default]
    First,
    Second,
}

/// Raw state of a dual-stream signal at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DualStream {
    /// Quantised stream 1 in `[-1, 1]`.
    pub stream1: f64,
    /// Quantised stream 2 in `[-1, 1]`.
    pub stream2: f64,
    /// The stream currently selected.
    pub active: ActiveStream,
}

impl DualStream {
    /// Value of the selected stream.
    pub fn active_value(&self) -> f64 {
        match self.active {
            ActiveStream::First => self.stream1,
            ActiveStream::Second => self.stream2,
        }
    }
}

/// Immutable result of one query.
///
/// Fields beyond the requested [`Lod`] stay at their zero default and carry no
/// meaning. Boundaries are caller frames; when a search gives up the boundary is
/// `frame ± max_search_frames` and the matching `*_capped` flag is set.
///
/// A boundary within `scan_frames` generator frames of the query is exact. A
/// farther boundary is always a real value change, but when the current value
/// recurs beyond a shorter, different hold the reported hold can span that
/// shorter hold too. It is then longer than the real one, never shorter. See
/// [`inspect`](crate::search::inspect).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldOutput {
    /// LOD 0: held value.
    pub value: f64,
    /// LOD 0: stream state, dual-stream generators only.
    pub streams: Option<DualStream>,
    /// LOD 1: value differs from the one a whole frame earlier.
    pub has_changed: bool,
    /// LOD 2: first frame of the current hold.
    pub last_changed_frame: f64,
    /// LOD 2: first frame of the next hold.
    pub next_changed_frame: f64,
    /// LOD 2: value at `next_changed_frame`.
    pub next_value: f64,
    /// LOD 2: fraction of the hold already elapsed, in `[0, 1)`.
    pub hold_progress: f64,
    /// LOD 2: `last_changed_frame` is the search-cap sentinel.
    pub last_changed_capped: bool,
    /// LOD 2: `next_changed_frame` is the search-cap sentinel.
    pub next_changed_capped: bool,
}

impl HoldOutput {
    /// Length of the current hold in caller frames.
    pub fn hold_length(&self) -> f64 {
        self.next_changed_frame - self.last_changed_frame
    }

    /// Both boundaries were actually found.
    pub fn is_bounded(&self) -> bool {
        !self.last_changed_capped && !self.next_changed_capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_from_level_clamps() {
        assert_eq!(Lod::from(0), Lod::Value);
        assert_eq!(Lod::from(1), Lod::Changed);
        assert_eq!(Lod::from(2), Lod::Full);
        assert_eq!(Lod::from(9), Lod::Full);
        assert!(Lod::Value < Lod::Full);
    }

    #[test]
    fn default_output_is_zeroed() {
        let out = HoldOutput::default();
        assert_eq!(out.value, 0.0);
        assert!(!out.has_changed);
        assert_eq!(out.hold_progress, 0.0);
        assert!(out.streams.is_none());
        assert!(out.is_bounded());
    }

    #[test]
    fn active_value_follows_selection() {
        let mut s = DualStream { stream1: 0.5, stream2: -0.25, active: ActiveStream::First };
        assert_eq!(s.active_value(), 0.5);
        s.active = ActiveStream::Second;
        assert_eq!(s.active_value(), -0.25);
    }
}
