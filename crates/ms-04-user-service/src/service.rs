//! User service implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use ms_01_circuit_breaker::CircuitBreaker;
use parking_lot::RwLock;
use shared_bus::{topics, EventPayload, EventPublisher};
use shared_types::{EntityId, FaultInjector, ServiceError, User};
use tracing::{debug, info};

use crate::domain::validate_new_user;
use crate::ports::UserApi;

/// Name used for the breaker, health check and log fields.
pub const SERVICE_NAME: &str = "user-service";

/// In-memory user registry.
pub struct UserService {
    users: RwLock<HashMap<EntityId, User>>,
    next_id: AtomicU64,
    breaker: Arc<CircuitBreaker>,
    publisher: Arc<dyn EventPublisher>,
    faults: Arc<FaultInjector>,
}

impl UserService {
    pub fn new(
        breaker: Arc<CircuitBreaker>,
        publisher: Arc<dyn EventPublisher>,
        faults: Arc<FaultInjector>,
    ) -> Self {
        info!(service = SERVICE_NAME, breaker = breaker.name(), "Initializing user service");
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            breaker,
            publisher,
            faults,
        }
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserApi for UserService {
    async fn create_user(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        let new_user = validate_new_user(name, email)?;

        let user = self
            .breaker
            .execute(|| async move {
                if self.faults.should_fail() {
                    return Err(ServiceError::transient(
                        "create_user",
                        "simulated storage failure",
                    ));
                }
                let user = User {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    name: new_user.name,
                    email: new_user.email,
                    created_at: Utc::now(),
                };
                self.users.write().insert(user.id, user.clone());
                Ok(user)
            })
            .await
            .map_err(|e| e.unwrap_or_open(ServiceError::circuit_open))?;

        info!(service = SERVICE_NAME, user_id = user.id, "User created");

        let delivered = self
            .publisher
            .publish(topics::USER_CREATED, EventPayload::UserCreated(user.clone()))
            .await;
        debug!(topic = topics::USER_CREATED, delivered, "Published user event");

        Ok(user)
    }

    fn get_user(&self, id: EntityId) -> Result<User, ServiceError> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotFound { entity: "user", id })
    }

    fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        Arc::clone(&self.breaker)
    }
}
