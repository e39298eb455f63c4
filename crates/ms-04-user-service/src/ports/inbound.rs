//! # Inbound Port - UserApi
//!
//! Driving port used by the gateway and by the order service's user lookup.

use std::sync::Arc;

use async_trait::async_trait;
use ms_01_circuit_breaker::CircuitBreaker;
use shared_types::{EntityId, ServiceError, User};

/// Primary API for the user service.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Register a new user.
    ///
    /// # Errors
    /// - `Validation`: empty name or malformed email
    /// - `CircuitOpen`: the service breaker is open
    /// - `Transient`: the insert failed
    async fn create_user(&self, name: &str, email: &str) -> Result<User, ServiceError>;

    /// Look up a user by id.
    fn get_user(&self, id: EntityId) -> Result<User, ServiceError>;

    /// All users, ordered by id.
    fn list_users(&self) -> Vec<User>;

    /// The breaker guarding this service.
    fn circuit_breaker(&self) -> Arc<CircuitBreaker>;
}
