//! # Order Service
//!
//! Accepts orders synchronously and completes them asynchronously.
//!
//! ## Order Flow
//!
//! ```text
//! create_order ──→ validate ──→ UserDirectory::user_exists
//!                                      │
//!                                      ↓
//!                     breaker.execute(insert pending) ──→ publish order.created
//!                                      │
//!                                      ↓
//!                     WorkerPool job: sleep(processing_delay)
//!                                      │
//!                     ┌────────────────┴────────────────┐
//!                     ↓ ok                              ↓ error / panic
//!             status = completed                 status = failed
//!             publish order.completed
//! ```
//!
//! The caller gets the pending order back as soon as the job is queued and
//! re-reads it to observe completion.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::OrderServiceConfig;
pub use ports::{OrderApi, UserDirectory};
pub use service::{OrderService, SERVICE_NAME};
