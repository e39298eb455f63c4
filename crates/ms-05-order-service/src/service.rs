//! Order service implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ms_01_circuit_breaker::CircuitBreaker;
use ms_02_worker_pool::{BoxError, JobError, JobHandle, WorkerPool};
use parking_lot::{Mutex, RwLock};
use shared_bus::{topics, EventPayload, EventPublisher};
use shared_types::{EntityId, FaultInjector, Order, OrderStatus, ServiceError};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::{validate_new_order, OrderServiceConfig};
use crate::ports::{OrderApi, UserDirectory};

/// Name used for the breaker, health check and log fields.
pub const SERVICE_NAME: &str = "order-service";

type OrderTable = Arc<RwLock<HashMap<EntityId, Order>>>;

/// In-memory order book.
pub struct OrderService {
    /// Shared with processing jobs.
    orders: OrderTable,
    next_id: AtomicU64,
    breaker: Arc<CircuitBreaker>,
    publisher: Arc<dyn EventPublisher>,
    pool: Arc<WorkerPool>,
    users: Arc<dyn UserDirectory>,
    faults: Arc<FaultInjector>,
    config: OrderServiceConfig,
    /// Tasks waiting on processing jobs to record their outcome.
    outcomes: Mutex<JoinSet<()>>,
}

impl OrderService {
    pub fn new(
        breaker: Arc<CircuitBreaker>,
        publisher: Arc<dyn EventPublisher>,
        pool: Arc<WorkerPool>,
        users: Arc<dyn UserDirectory>,
        faults: Arc<FaultInjector>,
        config: OrderServiceConfig,
    ) -> Self {
        info!(
            service = SERVICE_NAME,
            processing_delay_ms = config.processing_delay.as_millis() as u64,
            "Initializing order service"
        );
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            breaker,
            publisher,
            pool,
            users,
            faults,
            config,
            outcomes: Mutex::new(JoinSet::new()),
        }
    }

    pub fn config(&self) -> &OrderServiceConfig {
        &self.config
    }

    /// Queue the processing job for a freshly created order.
    ///
    /// A rejected submission leaves the order pending.
    async fn schedule_processing(&self, order_id: EntityId) {
        let orders = Arc::clone(&self.orders);
        let publisher = Arc::clone(&self.publisher);
        let faults = Arc::clone(&self.faults);
        let delay = self.config.processing_delay;

        let submitted = self
            .pool
            .spawn(move || process_order(orders, publisher, faults, order_id, delay))
            .await;

        match submitted {
            Ok(handle) => {
                debug!(service = SERVICE_NAME, order_id, job_id = handle.id(), "Order processing queued");
                let mut outcomes = self.outcomes.lock();
                while outcomes.try_join_next().is_some() {}
                outcomes.spawn(watch_processing(Arc::clone(&self.orders), order_id, handle));
            }
            Err(e) => {
                error!(
                    service = SERVICE_NAME,
                    order_id,
                    error = %e,
                    "Failed to queue order processing, order stays pending"
                );
            }
        }
    }
}

impl OrderService {
    /// Wait until every scheduled job has had its outcome recorded.
    ///
    /// Stop the worker pool first: a job still queued on a running pool
    /// keeps this waiting until it is processed.
    pub async fn stop(&self) {
        let mut outcomes = std::mem::take(&mut *self.outcomes.lock());
        let outstanding = outcomes.len();
        while outcomes.join_next().await.is_some() {}
        debug!(service = SERVICE_NAME, outstanding, "Order outcome tracking drained");
    }

    /// Jobs whose outcome has not been recorded yet.
    pub fn outstanding_jobs(&self) -> usize {
        let mut outcomes = self.outcomes.lock();
        while outcomes.try_join_next().is_some() {}
        outcomes.len()
    }
}

/// Processing job body.
async fn process_order(
    orders: OrderTable,
    publisher: Arc<dyn EventPublisher>,
    faults: Arc<FaultInjector>,
    order_id: EntityId,
    delay: Duration,
) -> Result<(), BoxError> {
    tokio::time::sleep(delay).await;

    if faults.should_fail() {
        return Err(format!("simulated processing failure for order {order_id}").into());
    }

    let completed = {
        let mut orders = orders.write();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| format!("order {order_id} disappeared before processing"))?;
        order.status = OrderStatus::Completed;
        order.completed_at = Some(Utc::now());
        order.clone()
    };

    info!(service = SERVICE_NAME, order_id, "Order completed");
    publisher
        .publish(topics::ORDER_COMPLETED, EventPayload::OrderCompleted(completed))
        .await;
    Ok(())
}

/// Await the job outcome and mark the order failed if processing did not
/// succeed.
async fn watch_processing(orders: OrderTable, order_id: EntityId, handle: JobHandle) {
    match handle.wait().await {
        Ok(()) => {}
        Err(JobError::Abandoned) => {
            warn!(service = SERVICE_NAME, order_id, "Order processing abandoned, order stays pending");
        }
        Err(e) => {
            warn!(service = SERVICE_NAME, order_id, error = %e, "Order processing failed");
            if let Some(order) = orders.write().get_mut(&order_id) {
                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::Failed;
                }
            }
        }
    }
}

#[async_trait]
impl OrderApi for OrderService {
    async fn create_order(
        &self,
        user_id: EntityId,
        product: &str,
        amount: f64,
    ) -> Result<Order, ServiceError> {
        let product = validate_new_order(product, amount)?;

        if !self.users.user_exists(user_id).await? {
            return Err(ServiceError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        let order = self
            .breaker
            .execute(|| async move {
                if self.faults.should_fail() {
                    return Err(ServiceError::transient(
                        "create_order",
                        "simulated storage failure",
                    ));
                }
                let order = Order {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    user_id,
                    product,
                    amount,
                    status: OrderStatus::Pending,
                    created_at: Utc::now(),
                    completed_at: None,
                };
                self.orders.write().insert(order.id, order.clone());
                Ok(order)
            })
            .await
            .map_err(|e| e.unwrap_or_open(ServiceError::circuit_open))?;

        info!(service = SERVICE_NAME, order_id = order.id, user_id, amount, "Order created");

        self.publisher
            .publish(topics::ORDER_CREATED, EventPayload::OrderCreated(order.clone()))
            .await;

        self.schedule_processing(order.id).await;
        Ok(order)
    }

    fn get_order(&self, id: EntityId) -> Result<Order, ServiceError> {
        self.orders
            .read()
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotFound { entity: "order", id })
    }

    fn list_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.read().values().cloned().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    fn orders_for_user(&self, user_id: EntityId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        Arc::clone(&self.breaker)
    }
}
