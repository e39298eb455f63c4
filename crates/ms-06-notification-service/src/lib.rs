//! # Notification Service
//!
//! Listens on every domain topic and turns each event into a notification
//! that is "sent" after a simulated delay.
//!
//! One subscription channel is registered for all topics when the service is
//! constructed, so events published before [`NotificationService::start`]
//! are buffered rather than lost (up to the channel capacity).
//!
//! Delivery is best-effort: a failed or short-circuited send marks the
//! notification `failed` and is not retried.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{compose, NotificationDraft, NotificationServiceConfig};
pub use ports::NotificationApi;
pub use service::{NotificationService, SERVICE_NAME};
