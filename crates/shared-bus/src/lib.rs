//! # Shared Bus - Message Broker for Inter-Service Events
//!
//! Services never call each other to announce state changes. They publish a
//! domain event on a topic and whoever subscribed to that topic reacts.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ UserService  │                    │ Notification │
//! │              │    publish()       │   Service    │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │MessageBroker │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery Rules
//!
//! - Fire-and-forget: the publisher only learns how many deliveries succeeded.
//! - Every subscriber send is bounded by its own timeout; a blocked subscriber
//!   loses that one message and nobody else is affected.
//! - Per subscriber, messages of one topic arrive in publish order.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{topics, EventPayload, Message};
pub use publisher::{BrokerConfig, BrokerStats, EventPublisher, MessageBroker};
pub use subscriber::{Subscription, SubscriptionError};

/// Default buffer size for subscription channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Default bound on a single subscriber delivery, in milliseconds.
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 100;
