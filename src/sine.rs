//! Sine evaluation strategies: direct `libm` evaluation or interpolated lookup tables.
//!
//! The tables are process-wide and immutable once built. They are built exactly
//! once, either explicitly through [`init_sine_tables`] or implicitly on the first
//! table lookup; both paths go through the same one-time latch, so a lookup can
//! never observe a partially built table and never silently drops to a
//! different precision.

#![forbid(unsafe_code)]

use crate::invariant_ppt::{assert_invariant, SINE_TABLES_BUILT};
use lazy_static::lazy_static;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};

/// Table resolutions, in samples per full cycle, for precision levels 1..=4.
pub const TABLE_RESOLUTIONS: [usize; 4] = [100, 500, 1000, 4096];

/// Accuracy/cost dial for waveform sine evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SinePrecision {
    /// Direct evaluation through `libm` (level 0).
    #[default]
    Direct,
    /// 100-sample table (level 1).
    Table100,
    /// 500-sample table (level 2).
    Table500,
    /// 1000-sample table (level 3).
    Table1000,
    /// 4096-sample table (level 4).
    Table4096,
}

impl SinePrecision {
    /// Numeric precision level, 0 = direct.
    pub const fn level(self) -> u8 {
        match self {
            SinePrecision::Direct => 0,
            SinePrecision::Table100 => 1,
            SinePrecision::Table500 => 2,
            SinePrecision::Table1000 => 3,
            SinePrecision::Table4096 => 4,
        }
    }

    /// Map a numeric level onto a strategy. Levels above 4 clamp to the finest table.
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => SinePrecision::Direct,
            1 => SinePrecision::Table100,
            2 => SinePrecision::Table500,
            3 => SinePrecision::Table1000,
            _ => SinePrecision::Table4096,
        }
    }

    fn table_index(self) -> Option<usize> {
        match self {
            SinePrecision::Direct => None,
            other => Some(other.level() as usize - 1),
        }
    }
}

/// One sampled cycle of sine over `[0, 2π)`.
#[derive(Debug, Clone)]
pub struct SineTable {
    samples: Box<[f64]>,
}

impl SineTable {
    /// Sample one full cycle at `resolution` points.
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution.max(2);
        let samples = (0..resolution)
            .map(|i| libm::sin(i as f64 / resolution as f64 * TAU))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { samples }
    }

    /// Number of samples in the cycle.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Tables always hold at least two samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Linearly interpolated sine. The last sample interpolates toward sample 0.
    pub fn lookup(&self, phase: f64) -> f64 {
        let size = self.samples.len();
        let wrapped = wrap_phase(phase);
        let position = wrapped / TAU * size as f64;
        let i0 = (libm::floor(position) as usize).min(size - 1);
        let frac = position - i0 as f64;
        let i1 = (i0 + 1) % size;
        let y0 = self.samples[i0];
        let y1 = self.samples[i1];
        y0 + frac * (y1 - y0)
    }
}

/// The full set of tables, one per [`TABLE_RESOLUTIONS`] entry.
#[derive(Debug)]
pub struct SineTables {
    tables: [SineTable; 4],
}

impl SineTables {
    fn build() -> Self {
        let tables = TABLE_RESOLUTIONS.map(SineTable::new);
        let shaped = tables
            .iter()
            .zip(TABLE_RESOLUTIONS)
            .all(|(t, n)| t.len() == n);
        assert_invariant(
            SINE_TABLES_BUILT,
            shaped,
            "Sine tables match their declared resolutions",
            Some("SineTables::build"),
        );
        log::debug!("built sine lookup tables at resolutions {:?}", TABLE_RESOLUTIONS);
        Self { tables }
    }

    /// Table for a precision level, `None` for [`SinePrecision::Direct`].
    pub fn table(&self, precision: SinePrecision) -> Option<&SineTable> {
        precision.table_index().map(|i| &self.tables[i])
    }
}

/// Set once the built tables are visible through [`SINE_TABLES`].
static INITIALISED: AtomicBool = AtomicBool::new(false);

lazy_static! {
    static ref SINE_TABLES: SineTables = SineTables::build();
}

/// Build the process-wide tables. Idempotent; later calls are no-ops.
pub fn init_sine_tables() {
    lazy_static::initialize(&SINE_TABLES);
    INITIALISED.store(true, Ordering::Release);
}

/// Whether the tables have been built yet.
pub fn sine_tables_initialised() -> bool {
    INITIALISED.load(Ordering::Acquire)
}

/// The process-wide tables, building them first if nobody has yet.
pub fn sine_tables() -> &'static SineTables {
    let tables: &'static SineTables = &SINE_TABLES;
    if !INITIALISED.load(Ordering::Relaxed) {
        INITIALISED.store(true, Ordering::Release);
    }
    tables
}

/// Wrap a phase into `[0, 2π)`.
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// `sin(phase)` through the chosen strategy.
#[inline]
pub fn sine(phase: f64, precision: SinePrecision) -> f64 {
    match precision.table_index() {
        None => libm::sin(phase),
        Some(index) => sine_tables().tables[index].lookup(phase),
    }
}
