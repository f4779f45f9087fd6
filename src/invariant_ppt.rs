//! PPT Invariant System: internal consistency checks with contract tracking.
//!
//! Checks guard conditions that hold by construction (a bisection really ended
//! on a value change, progress really lies in `[0, 1)`). A failure is a bug in
//! this crate, never a consequence of caller input, and panics loudly. With the
//! `ppt` feature each checked id is also recorded so tests can prove the check ran.
//!
//! Two tiers:
//! - [`assert_invariant`] records into a mutex-guarded set. Cold paths only
//!   (one-time table build).
//! - [`check_invariant`] sets a bit in an atomic word. No lock and no allocation
//!   unless the check fails, so the per-query search path uses it.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::atomic::{AtomicU32, Ordering};
#[cfg(feature = "ppt")]
use std::sync::Mutex;

pub const SINE_TABLES_BUILT: u32 = 1;
pub const BOUNDARY_BRACKETED: u32 = 2;
pub const BOUNDARY_ADJACENT: u32 = 3;
pub const PROGRESS_BOUNDED: u32 = 4;
pub const SEARCH_CAPPED: u32 = 5;

#[cfg(feature = "ppt")]
lazy_static! {
    static ref INVARIANT_LOG: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

#[cfg(feature = "ppt")]
/// Assert an invariant: logs it and panics on failure.
pub(crate) fn assert_invariant(id: u32, condition: bool, message: &str, context: Option<&str>) {
    if !condition {
        let full_message = if let Some(ctx) = context {
            format!("Invariant {} failed: {} (context: {})", id, message, ctx)
        } else {
            format!("Invariant {} failed: {}", id, message)
        };
        log::error!("{}", full_message);
        panic!("{}", full_message);
    }
    // A poisoned log only means another test panicked mid-insert.
    match INVARIANT_LOG.lock() {
        Ok(mut log) => {
            log.insert(id);
        }
        Err(poisoned) => {
            poisoned.into_inner().insert(id);
        }
    }
}

#[cfg(not(feature = "ppt"))]
/// Assert an invariant: checks condition and panics on failure.
pub(crate) fn assert_invariant(_id: u32, condition: bool, message: &str, _context: Option<&str>) {
    if !condition {
        panic!("Invariant failed: {}", message);
    }
}

#[cfg(feature = "ppt")]
static SIGNALLED: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "ppt")]
#[inline]
fn signal_bit(id: u32) -> u32 {
    1u32.checked_shl(id).unwrap_or(0)
}

/// Lock-free check for hot paths: panics on failure, otherwise only sets the id's bit.
#[inline]
pub(crate) fn check_invariant(id: u32, condition: bool, message: &'static str) {
    if !condition {
        log::error!("Invariant {} failed: {}", id, message);
        panic!("Invariant {} failed: {}", id, message);
    }
    #[cfg(feature = "ppt")]
    SIGNALLED.fetch_or(signal_bit(id), Ordering::Relaxed);
}

#[cfg(feature = "ppt")]
/// Contract test: checks that specified invariants were asserted.
pub fn contract_test(test_name: &str, required_invariants: &[u32]) {
    let log = INVARIANT_LOG.lock().unwrap_or_else(|p| p.into_inner());
    let missing: Vec<u32> = required_invariants
        .iter()
        .copied()
        .filter(|inv| !log.contains(inv))
        .collect();
    drop(log);
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not enforced: {:?}",
            test_name, missing
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test: no-op when PPT feature is disabled.
pub fn contract_test(_test_name: &str, _required_invariants: &[u32]) {}

#[cfg(feature = "ppt")]
/// Contract test for the lock-free tier: checks that specified invariants were signalled.
pub fn contract_test_signalled(test_name: &str, required_invariants: &[u32]) {
    let missing: Vec<&str> = required_invariants
        .iter()
        .copied()
        .filter(|&inv| !invariant_signalled(inv))
        .map(invariant_name)
        .collect();
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not signalled: {:?}",
            test_name, missing
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test for the lock-free tier: no-op when PPT feature is disabled.
pub fn contract_test_signalled(_test_name: &str, _required_invariants: &[u32]) {}

#[cfg(feature = "ppt")]
/// Whether `id` went through the mutex-guarded [`assert_invariant`] log.
pub fn invariant_logged(id: u32) -> bool {
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .contains(&id)
}

#[cfg(not(feature = "ppt"))]
/// Always false without the PPT feature.
pub fn invariant_logged(_id: u32) -> bool {
    false
}

#[cfg(feature = "ppt")]
/// Whether `id` was signalled through [`check_invariant`].
pub fn invariant_signalled(id: u32) -> bool {
    let bit = signal_bit(id);
    bit != 0 && SIGNALLED.load(Ordering::Relaxed) & bit != 0
}

#[cfg(not(feature = "ppt"))]
/// Always false without the PPT feature.
pub fn invariant_signalled(_id: u32) -> bool {
    false
}

#[cfg(feature = "ppt")]
/// Clear invariant log and signalled bits (for between test runs).
pub fn clear_invariant_log() {
    INVARIANT_LOG.lock().unwrap_or_else(|p| p.into_inner()).clear();
    SIGNALLED.store(0, Ordering::Relaxed);
}

#[cfg(not(feature = "ppt"))]
/// Clear invariant log: no-op when PPT feature is disabled.
pub fn clear_invariant_log() {}

/// Human-readable name of an invariant id (diagnostics only).
pub const fn invariant_name(id: u32) -> &'static str {
    match id {
        SINE_TABLES_BUILT => "SINE_TABLES_BUILT",
        BOUNDARY_BRACKETED => "BOUNDARY_BRACKETED",
        BOUNDARY_ADJACENT => "BOUNDARY_ADJACENT",
        PROGRESS_BOUNDED => "PROGRESS_BOUNDED",
        SEARCH_CAPPED => "SEARCH_CAPPED",
        _ => "UNKNOWN",
    }
}
