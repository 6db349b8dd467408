//! Error types produced by the settlement machinery itself.
//!
//! User failures travel through the settlement graph as ordinary rejection
//! payloads of type `E`; the types here are the two errors the crate
//! manufactures on its own.

use core::fmt;

use thiserror::Error;

/// A settlable was resolved with itself.
///
/// Adopting one's own eventual outcome can never make progress, so the
/// resolution is converted into an immediate rejection instead of looping.
/// Operations that can adopt a deferred value therefore require
/// `E: From<CircularResolution>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circular resolution: settlable resolved with itself")]
pub struct CircularResolution;

impl From<CircularResolution> for String {
    fn from(err: CircularResolution) -> Self {
        err.to_string()
    }
}

/// The failure payload of [`any`]: every input rejected.
///
/// `reasons[i]` is the rejection reason of `inputs[i]`, in input order
/// regardless of settlement order. Consumers identify this error by the
/// carried reasons, not by the display text.
///
/// [`any`]: crate::combinator::any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError<E> {
    /// Per-input rejection reasons, index-stable.
    pub reasons: Vec<E>,
}

impl<E> AggregateError<E> {
    pub(crate) fn new(reasons: Vec<E>) -> Self {
        Self { reasons }
    }
}

impl<E> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all settlables were rejected")
    }
}

impl<E: fmt::Debug> std::error::Error for AggregateError<E> {}

// An aggregate reason type must itself satisfy the adoption bound so that
// the settlable returned by `any` remains chainable. A cycle involves no
// inputs, hence the empty reason list.
impl<E> From<CircularResolution> for AggregateError<E> {
    fn from(_: CircularResolution) -> Self {
        Self::new(Vec::new())
    }
}
