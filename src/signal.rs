//! The frame → held value interface every generator implements.

#![forbid(unsafe_code)]

use crate::output::DualStream;
use std::sync::Arc;

/// A stateless, piecewise-constant function of the generator frame.
///
/// Implementors must be pure: the same frame always yields the same bits. The
/// search engine relies on nothing else, so any closure with that property can
/// be inspected through [`FnSignal`].
pub trait HeldSignal: Send + Sync {
    /// Held value at a generator frame.
    fn value_at(&self, frame: i64) -> f64;

    /// Raw stream state for dual-stream signals. Single-stream signals return `None`.
    fn streams_at(&self, _frame: i64) -> Option<DualStream> {
        None
    }
}

impl<S: HeldSignal + ?Sized> HeldSignal for &S {
    fn value_at(&self, frame: i64) -> f64 {
        (**self).value_at(frame)
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        (**self).streams_at(frame)
    }
}

impl<S: HeldSignal + ?Sized> HeldSignal for Box<S> {
    fn value_at(&self, frame: i64) -> f64 {
        (**self).value_at(frame)
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        (**self).streams_at(frame)
    }
}

impl<S: HeldSignal + ?Sized> HeldSignal for Arc<S> {
    fn value_at(&self, frame: i64) -> f64 {
        (**self).value_at(frame)
    }

    fn streams_at(&self, frame: i64) -> Option<DualStream> {
        (**self).streams_at(frame)
    }
}

/// Adapter turning a plain `Fn(i64) -> f64` into a [`HeldSignal`].
#[derive(Clone, Copy)]
pub struct FnSignal<F>(pub F);

impl<F> HeldSignal for FnSignal<F>
where
    F: Fn(i64) -> f64 + Send + Sync,
{
    fn value_at(&self, frame: i64) -> f64 {
        (self.0)(frame)
    }
}

impl<F> std::fmt::Debug for FnSignal<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FnSignal")
    }
}

/// Bitwise equality, so `0.0`/`-0.0` and NaNs compare the same way every time.
#[inline]
pub fn same_value(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}
