//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Accounts**: `User`
//! - **Commerce**: `Order`, `OrderStatus`
//! - **Messaging**: `Notification`, `NotificationKind`, `NotificationStatus`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an entity inside its owning service.
///
/// Ids are allocated per service, start at 1 and only grow.
pub type EntityId = u64;

// =============================================================================
// CLUSTER A: ACCOUNTS
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER B: COMMERCE
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
/// [pending] ──processing job ok──→ [completed]
///     │
///     └──── processing job failed ──→ [failed]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

/// An order placed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    pub user_id: EntityId,
    pub product: String,
    pub amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Set once the asynchronous processing step has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the order has reached a terminal status.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status != OrderStatus::Pending
    }
}

// =============================================================================
// CLUSTER C: MESSAGING
// =============================================================================

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    OrderConfirmation,
    OrderCompleted,
}

/// Delivery state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

/// A notification synthesized from a domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    pub kind: NotificationKind,
    pub message: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}
