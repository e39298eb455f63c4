//! # Error Types
//!
//! Defines the error taxonomy shared by all domain services.

use crate::entities::EntityId;
use thiserror::Error;

/// Errors returned by domain service operations.
///
/// | Variant | Meaning | Counted by breaker |
/// |---------|---------|--------------------|
/// | `Validation` | Malformed input | no |
/// | `NotFound` | Unknown entity | no |
/// | `CircuitOpen` | Breaker short-circuited the call | no |
/// | `Transient` | Simulated or real dependency failure | yes |
/// | `Unavailable` | A collaborator has shut down | no |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Input rejected before any state was touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Entity lookup failed.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    /// The protecting circuit breaker is open.
    #[error("circuit breaker '{0}' is open")]
    CircuitOpen(String),

    /// The operation failed and may succeed if retried by the caller.
    #[error("{operation} failed: {reason}")]
    Transient {
        operation: &'static str,
        reason: String,
    },

    /// A collaborator (worker pool, broker) is no longer accepting work.
    #[error("{0} unavailable")]
    Unavailable(String),
}

impl ServiceError {
    /// Constructor for the circuit-open case, shaped for `map_err` chains.
    pub fn circuit_open(name: String) -> Self {
        Self::CircuitOpen(name)
    }

    /// Build a transient failure for `operation`.
    pub fn transient(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Transient {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether the error originated from malformed caller input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}
