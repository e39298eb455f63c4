//! # Inbound Port - OrderApi

use std::sync::Arc;

use async_trait::async_trait;
use ms_01_circuit_breaker::CircuitBreaker;
use shared_types::{EntityId, Order, ServiceError};

/// Primary API for the order service.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Place an order for an existing user.
    ///
    /// Returns the order in `pending` status; processing continues on the
    /// worker pool.
    ///
    /// # Errors
    /// - `Validation`: empty product or non-positive amount
    /// - `NotFound`: unknown user
    /// - `CircuitOpen` / `Transient`: the insert was rejected or failed
    async fn create_order(
        &self,
        user_id: EntityId,
        product: &str,
        amount: f64,
    ) -> Result<Order, ServiceError>;

    fn get_order(&self, id: EntityId) -> Result<Order, ServiceError>;

    /// All orders, ordered by id.
    fn list_orders(&self) -> Vec<Order>;

    /// Orders placed by `user_id`, ordered by id.
    fn orders_for_user(&self, user_id: EntityId) -> Vec<Order>;

    fn circuit_breaker(&self) -> Arc<CircuitBreaker>;
}
