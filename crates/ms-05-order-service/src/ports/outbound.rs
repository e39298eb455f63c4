//! # Outbound Port - UserDirectory
//!
//! Implemented by the runtime over the user service.

use async_trait::async_trait;
use shared_types::{EntityId, ServiceError};

/// Lookup of registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether `user_id` refers to a registered user.
    async fn user_exists(&self, user_id: EntityId) -> Result<bool, ServiceError>;
}
