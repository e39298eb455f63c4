//! # Domain Events
//!
//! Defines the message envelope and every event payload that flows through
//! the broker. The payload set is closed: adding an event kind means adding a
//! variant here, and every consumer that matches on it stops compiling until
//! it handles the new case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::entities::{EntityId, Order, User};
use uuid::Uuid;

/// Canonical topic names.
pub mod topics {
    /// A user was registered.
    pub const USER_CREATED: &str = "user.created";
    /// An order was accepted and is pending processing.
    pub const ORDER_CREATED: &str = "order.created";
    /// An order finished asynchronous processing.
    pub const ORDER_COMPLETED: &str = "order.completed";

    /// Every topic a domain service publishes.
    pub const ALL: [&str; 3] = [USER_CREATED, ORDER_CREATED, ORDER_COMPLETED];
}

/// All payloads that can be published to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// Source: UserService | Consumers: NotificationService
    UserCreated(User),

    /// Source: OrderService | Consumers: NotificationService
    OrderCreated(Order),

    /// Source: OrderService worker job | Consumers: NotificationService
    OrderCompleted(Order),
}

impl EventPayload {
    /// The topic this payload is published under.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            EventPayload::UserCreated(_) => topics::USER_CREATED,
            EventPayload::OrderCreated(_) => topics::ORDER_CREATED,
            EventPayload::OrderCompleted(_) => topics::ORDER_COMPLETED,
        }
    }

    /// Id of the user the event concerns.
    #[must_use]
    pub fn user_id(&self) -> EntityId {
        match self {
            EventPayload::UserCreated(user) => user.id,
            EventPayload::OrderCreated(order) | EventPayload::OrderCompleted(order) => {
                order.user_id
            }
        }
    }
}

/// A message as delivered to subscribers.
///
/// Created once per publish call and cloned into every subscriber channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Time-ordered unique id.
    pub id: Uuid,
    pub topic: String,
    pub payload: EventPayload,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Wrap `payload` for delivery on `topic`.
    pub fn new(topic: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            topic: topic.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}
