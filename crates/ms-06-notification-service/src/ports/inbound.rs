//! # Inbound Port - NotificationApi
//!
//! Read-only; notifications are only created from events.

use std::sync::Arc;

use ms_01_circuit_breaker::CircuitBreaker;
use shared_types::{EntityId, Notification, ServiceError};

pub trait NotificationApi: Send + Sync {
    /// All notifications, ordered by id.
    fn list_notifications(&self) -> Vec<Notification>;

    fn get_notification(&self, id: EntityId) -> Result<Notification, ServiceError>;

    /// Notifications addressed to `user_id`, ordered by id.
    fn notifications_for_user(&self, user_id: EntityId) -> Vec<Notification>;

    fn circuit_breaker(&self) -> Arc<CircuitBreaker>;
}
