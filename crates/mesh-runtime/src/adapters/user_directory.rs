//! `UserDirectory` for the order service, backed by the user service.

use std::sync::Arc;

use async_trait::async_trait;
use ms_04_user_service::UserApi;
use ms_05_order_service::UserDirectory;
use shared_types::{EntityId, ServiceError};

/// Answers order-service lookups from the user service's table.
pub struct UserServiceDirectory {
    users: Arc<dyn UserApi>,
}

impl UserServiceDirectory {
    pub fn new(users: Arc<dyn UserApi>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for UserServiceDirectory {
    async fn user_exists(&self, user_id: EntityId) -> Result<bool, ServiceError> {
        match self.users.get_user(user_id) {
            Ok(_) => Ok(true),
            Err(ServiceError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
