//! HTTP handlers and the state they share.

pub mod notifications;
pub mod orders;
pub mod system;
pub mod users;

use std::sync::Arc;

use ms_01_circuit_breaker::CircuitBreaker;
use ms_02_worker_pool::WorkerPool;
use ms_03_health_check::HealthChecker;
use ms_04_user_service::UserApi;
use ms_05_order_service::OrderApi;
use ms_06_notification_service::NotificationApi;
use shared_bus::MessageBroker;

use crate::middleware::GatewayMetrics;

/// Collaborators injected into the gateway.
#[derive(Clone)]
pub struct GatewayDeps {
    pub users: Arc<dyn UserApi>,
    pub orders: Arc<dyn OrderApi>,
    pub notifications: Arc<dyn NotificationApi>,
    pub health: Arc<HealthChecker>,
    pub pool: Arc<WorkerPool>,
    pub broker: Arc<MessageBroker>,
}

impl GatewayDeps {
    /// Every service breaker, in a stable order.
    pub fn breakers(&self) -> Vec<Arc<CircuitBreaker>> {
        vec![
            self.users.circuit_breaker(),
            self.orders.circuit_breaker(),
            self.notifications.circuit_breaker(),
        ]
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub deps: GatewayDeps,
    pub metrics: Arc<GatewayMetrics>,
}
