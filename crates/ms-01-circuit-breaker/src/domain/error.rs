//! Breaker error type.

use std::fmt;

/// Outcome of a rejected or failed [`execute`](crate::CircuitBreaker::execute).
///
/// `Open` is the sentinel for short-circuited calls and is distinguishable
/// from anything the wrapped operation can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitBreakerError<E> {
    /// The breaker rejected the call without invoking the operation.
    Open { name: String },

    /// The operation ran and failed; the error is passed through unchanged.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { name } => write!(f, "circuit breaker '{}' is open", name),
            Self::Inner(err) => err.fmt(f),
        }
    }
}

impl<E> std::error::Error for CircuitBreakerError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { .. } => None,
            Self::Inner(err) => err.source(),
        }
    }
}

impl<E> CircuitBreakerError<E> {
    /// Whether the call was short-circuited.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Return the wrapped error, or build one from the breaker name when the
    /// call was short-circuited.
    pub fn unwrap_or_open(self, open: impl FnOnce(String) -> E) -> E {
        match self {
            Self::Open { name } => open(name),
            Self::Inner(err) => err,
        }
    }
}
