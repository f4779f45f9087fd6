//! Search Proof Harness: empirical evidence for the engine's cost guarantees.

use crate::output::DualStream;
use crate::signal::HeldSignal;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a signal and counts every evaluation made through it.
#[derive(Debug, Default)]
pub struct CountingSignal<S> {
    inner: S,
    evaluations: AtomicUsize,
}

impl<S> CountingSignal<S> {
    /// Wrap `inner` with a zeroed counter.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Evaluations since construction or the last reset.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Zero the counter.
    pub fn reset(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }

    /// The wrapped signal, for uncounted evaluation.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: HeldSignal> HeldSignal for CountingSignal<S> {
    fn value_at(&self, frame: i64) -> f64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.inner.value_at(frame)
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        self.inner.streams_at(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Lod;
    use crate::search::{inspect, SearchConfig};
    use crate::signal::FnSignal;

    #[test]
    fn harness_counts_lod_levels() {
        let counted = CountingSignal::new(FnSignal(|f: i64| f.div_euclid(50) as f64));
        inspect(&counted, 120.0, &SearchConfig::new(Lod::Value));
        assert_eq!(counted.evaluations(), 1);
        counted.reset();
        inspect(&counted, 120.0, &SearchConfig::new(Lod::Changed));
        assert_eq!(counted.evaluations(), 2);
        counted.reset();
        inspect(&counted, 120.0, &SearchConfig::new(Lod::Full));
        // hold 100..150: walks of 21 and 30 frames plus the value, flag and next value
        assert_eq!(counted.evaluations(), 54);
    }
}
