//! Metadata inference: recover hold boundaries from nothing but point evaluations.
//!
//! Each direction walks whole generator frames away from the frame under the
//! query tick, in three phases:
//!
//! 1. **Scan** the first `scan_frames` frames one by one. A hold that ends
//!    inside this window is found exactly, even when its value recurs right
//!    after a shorter, different hold.
//! 2. **Gallop** past the window at offsets `scan + 1`, `scan + 2`, `scan + 4`, ...
//!    until a frame disagrees with the current value or the cap is reached. The
//!    previous offset still agrees, so the change lies between the two.
//! 3. **Bisect** that bracket, keeping the agreeing end `near` and the
//!    disagreeing end `far`, until they are adjacent frames.
//!
//! Past the scan window both phases are logarithmic in the hold length. The
//! found frames are mapped back onto the tick lattice of [`Timeline`]: the last
//! boundary is the first tick of the current hold, the next boundary the first
//! tick of the following one. When the changed flag is already set, the frame a
//! whole caller frame back is a known far end and nothing past it is evaluated.

#![forbid(unsafe_code)]

use crate::invariant_ppt::{
    check_invariant, BOUNDARY_ADJACENT, BOUNDARY_BRACKETED, PROGRESS_BOUNDED, SEARCH_CAPPED,
};
use crate::output::{HoldOutput, Lod};
use crate::signal::{same_value, HeldSignal};
use crate::timeline::Timeline;

/// Default search limit, in caller frames, for each direction.
pub const DEFAULT_MAX_SEARCH_FRAMES: u32 = 1000;

/// Default number of generator frames checked one by one before the step starts doubling.
pub const DEFAULT_SCAN_FRAMES: u32 = 64;

/// Largest `f64` below one; hold progress never reaches a full hold.
const PROGRESS_CEILING: f64 = 1.0 - f64::EPSILON / 2.0;

/// What a query computes and how far it may look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Level of detail.
    pub lod: Lod,
    /// Per-direction search limit in caller frames. Zero behaves as one.
    pub max_search_frames: u32,
    /// Generator frames per direction checked one by one before galloping.
    /// Holds that end within this many frames are always reported exactly.
    pub scan_frames: u32,
    /// Time multiplier and tick lattice.
    pub timeline: Timeline,
}

impl SearchConfig {
    /// Config at the given LOD with default limits and timeline.
    pub fn new(lod: Lod) -> Self {
        Self {
            lod,
            max_search_frames: DEFAULT_MAX_SEARCH_FRAMES,
            scan_frames: DEFAULT_SCAN_FRAMES,
            timeline: Timeline::default(),
        }
    }

    /// Per-direction search limit in caller frames.
    pub fn with_max_search_frames(mut self, frames: u32) -> Self {
        self.max_search_frames = frames;
        self
    }

    /// Width of the exact scan window. Zero gallops from the first frame.
    pub fn with_scan_frames(mut self, frames: u32) -> Self {
        self.scan_frames = frames;
        self
    }

    /// Replace the timeline, e.g. one built with a custom inflation factor.
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    /// Shorthand for a timeline with the default inflation.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.timeline = Timeline::new(multiplier);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(Lod::Full)
    }
}

/// Direction in caller time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

impl Direction {
    #[inline]
    fn tick(self, origin: i64, offset: i64) -> i64 {
        match self {
            Direction::Backward => origin.saturating_sub(offset),
            Direction::Forward => origin.saturating_add(offset),
        }
    }
}

/// Generator frames one direction of the search may visit.
///
/// A negative multiplier runs the generator backwards, so `step` is whichever
/// sign leads from the origin frame toward the frame under the capped tick.
#[derive(Debug, Clone, Copy)]
struct Walk {
    origin: i64,
    step: i64,
    /// Offset of the frame under the capped tick.
    limit: i64,
}

impl Walk {
    fn new(timeline: &Timeline, origin_tick: i64, origin: i64, direction: Direction, cap: i64) -> Self {
        let edge = timeline.generator_frame(direction.tick(origin_tick, cap));
        let distance = edge.saturating_sub(origin);
        Self {
            origin,
            step: distance.signum(),
            limit: distance.saturating_abs(),
        }
    }

    #[inline]
    fn frame(&self, offset: i64) -> i64 {
        self.origin.saturating_add(self.step.saturating_mul(offset))
    }
}

/// Offsets from the origin frame: `near` agrees with the current value, `far` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bracket {
    near: i64,
    far: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Adjacent bracket around a real change.
    Found(Bracket),
    /// Nothing changed up to the walk limit.
    Capped,
}

/// Phase 1. Checks offsets `1..=end` in order.
fn scan<F>(differs: &F, end: i64) -> (Option<Bracket>, usize)
where
    F: Fn(i64) -> bool,
{
    let mut evaluations = 0usize;
    for offset in 1..=end {
        evaluations += 1;
        if differs(offset) {
            return (Some(Bracket { near: offset - 1, far: offset }), evaluations);
        }
    }
    (None, evaluations)
}

/// Phase 2. Doubles the step from an agreeing `near` offset. `None` once `limit` agreed too.
fn gallop<F>(differs: &F, mut near: i64, limit: i64) -> (Option<Bracket>, usize)
where
    F: Fn(i64) -> bool,
{
    let mut step = 1i64;
    let mut evaluations = 0usize;
    loop {
        let offset = near.saturating_add(step).min(limit);
        evaluations += 1;
        if differs(offset) {
            check_invariant(
                BOUNDARY_BRACKETED,
                near < offset,
                "Gallop bracket has an agreeing near end before the change",
            );
            return (Some(Bracket { near, far: offset }), evaluations);
        }
        if offset == limit {
            return (None, evaluations);
        }
        near = offset;
        step = step.saturating_mul(2);
    }
}

/// Phase 3. Narrows a bracket until `far` is the frame right after `near`.
fn bisect<F>(differs: &F, mut bracket: Bracket) -> (Bracket, usize)
where
    F: Fn(i64) -> bool,
{
    let mut evaluations = 0usize;
    while bracket.far - bracket.near > 1 {
        let mid = bracket.near + (bracket.far - bracket.near) / 2;
        evaluations += 1;
        if differs(mid) {
            bracket.far = mid;
        } else {
            bracket.near = mid;
        }
    }
    check_invariant(
        BOUNDARY_ADJACENT,
        bracket.far - bracket.near == 1,
        "Bisection ends on adjacent frames",
    );
    (bracket, evaluations)
}

/// First disagreeing offset along a walk. `known_far`, when set, is an offset
/// already known to disagree, so nothing beyond it is evaluated.
fn find_boundary<F>(
    differs: &F,
    direction: Direction,
    limit: i64,
    scan_frames: i64,
    known_far: Option<i64>,
) -> Boundary
where
    F: Fn(i64) -> bool,
{
    let scan_end = scan_frames.min(known_far.map_or(limit, |far| far - 1));
    let (mut bracket, mut evaluations) = scan(differs, scan_end);
    if bracket.is_none() {
        bracket = match known_far {
            Some(far) => Some(Bracket { near: scan_end, far }),
            None if scan_end < limit => {
                let (found, steps) = gallop(differs, scan_end, limit);
                evaluations += steps;
                found
            }
            None => None,
        };
    }
    match bracket {
        Some(bracket) => {
            let (bracket, steps) = bisect(differs, bracket);
            log::trace!(
                "{:?} boundary {} frames out after {} evaluations",
                direction,
                bracket.far,
                evaluations + steps
            );
            Boundary::Found(bracket)
        }
        None => {
            check_invariant(
                SEARCH_CAPPED,
                known_far.is_none(),
                "Only a search without a known change can run out",
            );
            log::debug!("{:?} search exhausted {} frames without a change", direction, limit);
            Boundary::Capped
        }
    }
}

/// Query a signal at a caller frame.
///
/// Works for any [`HeldSignal`], including plain closures wrapped in
/// [`FnSignal`](crate::signal::FnSignal). Never fails: when no change is found
/// within `max_search_frames` the boundary is `frame ± max_search_frames` and the
/// matching `*_capped` flag is set.
///
/// A hold that ends within `scan_frames` generator frames of the query is
/// reported exactly. Beyond that window the search samples sparsely: if the
/// current value comes back after a shorter hold with a different value, and a
/// galloping step lands on the returning value, the reported hold runs past the
/// real change and covers that shorter hold. The reported hold is then too
/// long, never too short, and each reported boundary is still a real change.
pub fn inspect<S>(signal: &S, frame: f64, config: &SearchConfig) -> HoldOutput
where
    S: HeldSignal + ?Sized,
{
    let timeline = config.timeline;
    let origin_tick = timeline.inflate(frame);
    let origin = timeline.generator_frame(origin_tick);
    let current = signal.value_at(origin);
    let mut out = HoldOutput {
        value: current,
        streams: signal.streams_at(origin),
        ..HoldOutput::default()
    };
    if config.lod < Lod::Changed {
        return out;
    }

    let previous = timeline.generator_frame(origin_tick.saturating_sub(timeline.inflation()));
    out.has_changed = !same_value(signal.value_at(previous), current);
    if config.lod < Lod::Full {
        return out;
    }

    let cap = timeline.span(config.max_search_frames.max(1));
    let scan_frames = i64::from(config.scan_frames);

    let backward = Walk::new(&timeline, origin_tick, origin, Direction::Backward, cap);
    let differs = |offset: i64| !same_value(signal.value_at(backward.frame(offset)), current);
    // the previous caller frame lies on the backward walk, between origin and edge
    let known = out
        .has_changed
        .then(|| previous.saturating_sub(origin).saturating_abs());
    let floor_tick = origin_tick.saturating_sub(cap);
    let last_tick = match find_boundary(&differs, Direction::Backward, backward.limit, scan_frames, known) {
        Boundary::Found(b) => {
            timeline.first_tick_reaching(backward.frame(b.near), floor_tick, origin_tick)
        }
        Boundary::Capped => {
            out.last_changed_capped = true;
            floor_tick
        }
    };

    let forward = Walk::new(&timeline, origin_tick, origin, Direction::Forward, cap);
    let differs = |offset: i64| !same_value(signal.value_at(forward.frame(offset)), current);
    let ceiling_tick = origin_tick.saturating_add(cap);
    let next_tick = match find_boundary(&differs, Direction::Forward, forward.limit, scan_frames, None) {
        Boundary::Found(b) => {
            timeline.first_tick_reaching(forward.frame(b.far), origin_tick, ceiling_tick)
        }
        Boundary::Capped => {
            out.next_changed_capped = true;
            ceiling_tick
        }
    };

    out.last_changed_frame = timeline.deflate(last_tick);
    out.next_changed_frame = timeline.deflate(next_tick);
    out.next_value = signal.value_at(timeline.generator_frame(next_tick));
    out.hold_progress = hold_progress(last_tick, origin_tick, next_tick, out.is_bounded());
    out
}

/// Fraction of the hold elapsed on the scaled timeline.
///
/// Scaled position is linear in the tick, so the tick ratio is the scaled ratio.
fn hold_progress(last_tick: i64, tick: i64, next_tick: i64, bounded: bool) -> f64 {
    let span = next_tick.saturating_sub(last_tick);
    if span == 0 {
        return 0.0;
    }
    let progress = tick.saturating_sub(last_tick) as f64 / span as f64;
    if !bounded {
        return progress.clamp(0.0, PROGRESS_CEILING);
    }
    check_invariant(
        PROGRESS_BOUNDED,
        last_tick <= tick && tick < next_tick && (0.0..=1.0).contains(&progress),
        "Query tick lies inside the hold it reports",
    );
    // spans beyond 2^53 ticks can round a last-tick ratio up to one
    progress.min(PROGRESS_CEILING)
}
