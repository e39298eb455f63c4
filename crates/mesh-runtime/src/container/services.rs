//! Construction, health probes and lifecycle of the mesh services.

use std::sync::Arc;

use ms_01_circuit_breaker::{CircuitBreaker, CircuitState};
use ms_02_worker_pool::{WorkerPool, WorkerPoolError};
use ms_03_health_check::HealthChecker;
use ms_04_user_service::{UserApi, UserService};
use ms_05_order_service::{OrderApi, OrderService};
use ms_06_notification_service::{NotificationApi, NotificationService};
use ms_07_api_gateway::GatewayDeps;
use shared_bus::{EventPublisher, MessageBroker};
use shared_types::FaultInjector;
use tracing::info;

use super::config::{ConfigError, MeshConfig};
use crate::adapters::UserServiceDirectory;

/// Health check name for the worker pool.
pub const POOL_CHECK: &str = "worker-pool";

/// Health check name for the notification listener.
pub const LISTENER_CHECK: &str = "notification-listener";

/// Every service of the mesh, wired together.
pub struct ServiceContainer {
    pub config: MeshConfig,
    pub broker: Arc<MessageBroker>,
    pub pool: Arc<WorkerPool>,
    pub health: Arc<HealthChecker>,
    pub faults: Arc<FaultInjector>,
    pub users: Arc<UserService>,
    pub orders: Arc<OrderService>,
    pub notifications: Arc<NotificationService>,
}

impl ServiceContainer {
    /// Build every service. Nothing runs until [`start`](Self::start).
    pub fn new(config: MeshConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let broker = Arc::new(MessageBroker::with_config(config.broker.clone()));
        let publisher = Arc::clone(&broker) as Arc<dyn EventPublisher>;
        let pool = Arc::new(WorkerPool::new(config.pool)?);
        let faults = Arc::new(FaultInjector::new(config.failure_rate));

        let users = Arc::new(UserService::new(
            Arc::new(CircuitBreaker::new(
                ms_04_user_service::SERVICE_NAME,
                config.breaker.clone(),
            )),
            Arc::clone(&publisher),
            Arc::clone(&faults),
        ));

        let orders = Arc::new(OrderService::new(
            Arc::new(CircuitBreaker::new(
                ms_05_order_service::SERVICE_NAME,
                config.breaker.clone(),
            )),
            Arc::clone(&publisher),
            Arc::clone(&pool),
            Arc::new(UserServiceDirectory::new(
                Arc::clone(&users) as Arc<dyn UserApi>
            )),
            Arc::clone(&faults),
            config.orders,
        ));

        let notifications = Arc::new(NotificationService::new(
            &broker,
            Arc::new(CircuitBreaker::new(
                ms_06_notification_service::SERVICE_NAME,
                config.breaker.clone(),
            )),
            Arc::clone(&faults),
            config.notifications,
        ));

        let container = Self {
            config,
            broker,
            pool,
            health: Arc::new(HealthChecker::new()),
            faults,
            users,
            orders,
            notifications,
        };
        container.register_health_checks();

        info!(
            workers = container.config.pool.workers,
            failure_rate = container.config.failure_rate,
            "Service container initialized"
        );
        Ok(container)
    }

    /// One probe per breaker plus the background tasks.
    fn register_health_checks(&self) {
        for breaker in self.breakers() {
            let name = breaker.name().to_string();
            self.health.register_check(name, move || {
                if breaker.state() == CircuitState::Open {
                    Err("circuit breaker is open")
                } else {
                    Ok(())
                }
            });
        }

        let pool = Arc::clone(&self.pool);
        self.health.register_check(POOL_CHECK, move || {
            if pool.is_running() {
                Ok(())
            } else {
                Err("worker pool is not running")
            }
        });

        let notifications = Arc::clone(&self.notifications);
        self.health.register_check(LISTENER_CHECK, move || {
            if notifications.is_running() {
                Ok(())
            } else {
                Err("notification listener is not running")
            }
        });
    }

    /// The three service breakers.
    pub fn breakers(&self) -> Vec<Arc<CircuitBreaker>> {
        vec![
            self.users.circuit_breaker(),
            self.orders.circuit_breaker(),
            self.notifications.circuit_breaker(),
        ]
    }

    /// Start the worker pool and the notification listener.
    pub fn start(&self) -> Result<(), WorkerPoolError> {
        self.pool.start()?;
        self.notifications.start();
        info!("Background services started");
        Ok(())
    }

    /// Stop the listener, then drain the pool.
    pub async fn stop(&self) {
        self.notifications.stop().await;
        self.pool.stop().await;
        self.orders.stop().await;
        info!("Background services stopped");
    }

    /// Collaborators for the HTTP gateway.
    pub fn gateway_deps(&self) -> GatewayDeps {
        GatewayDeps {
            users: Arc::clone(&self.users) as Arc<dyn UserApi>,
            orders: Arc::clone(&self.orders) as Arc<dyn OrderApi>,
            notifications: Arc::clone(&self.notifications) as Arc<dyn NotificationApi>,
            health: Arc::clone(&self.health),
            pool: Arc::clone(&self.pool),
            broker: Arc::clone(&self.broker),
        }
    }
}
