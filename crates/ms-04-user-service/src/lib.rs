//! # User Service
//!
//! Owns the user registry. Every insert runs inside the service's circuit
//! breaker and is announced on `user.created` once committed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   UserApi   ┌─────────────┐  execute  ┌────────────────┐
//! │   Gateway    │ ──────────→ │ UserService │ ────────→ │ CircuitBreaker │
//! └──────────────┘             └─────────────┘           └────────────────┘
//!                                     │ publish
//!                                     ↓
//!                              ┌───────────────┐
//!                              │ MessageBroker │ ──→ user.created
//!                              └───────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use ports::UserApi;
pub use service::{UserService, SERVICE_NAME};
