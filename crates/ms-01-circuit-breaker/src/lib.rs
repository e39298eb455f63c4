//! # Circuit Breaker
//!
//! Stops calling a failing dependency for a cool-down period after repeated
//! failures, then lets a single trial call through to probe for recovery.
//!
//! ## State Machine
//!
//! ```text
//!                   success (count reset)
//!             ┌─────────────────────────────┐
//!             │                             │
//!             ▼                             │
//!       ┌──────────┐  max_failures   ┌──────────┐  timeout elapsed   ┌──────────┐
//!       │  CLOSED  │ ──────────────► │   OPEN   │ ─────────────────► │HALF-OPEN │
//!       │ (normal) │                 │ (reject) │ ◄───────────────── │ (1 trial)│
//!       └──────────┘                 └──────────┘   trial failed     └──────────┘
//!             ▲                                                           │
//!             └───────────────────────────────────────────────────────────┘
//!                                 trial succeeded
//! ```
//!
//! ## Concurrency
//!
//! State and counters live behind one mutex that is never held while the
//! wrapped operation runs. During Half-Open a trial permit admits exactly one
//! caller; everybody else is rejected as if the breaker were still open.
//!
//! Panics inside the wrapped operation are the caller's business and
//! propagate untouched.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod breaker;
pub mod domain;

pub use breaker::CircuitBreaker;
pub use domain::{CircuitBreakerConfig, CircuitBreakerError, CircuitState, CircuitStats, ConfigError};
