//! Request and response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ms_01_circuit_breaker::{CircuitState, CircuitStats};
use ms_02_worker_pool::PoolStats;
use serde::{Deserialize, Serialize};
use shared_bus::BrokerStats;
use shared_types::EntityId;

/// `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

/// `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: EntityId,
    pub product: String,
    pub amount: f64,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Breaker name to current state.
    pub circuit_breakers: BTreeMap<String, CircuitState>,
    pub breakers: Vec<CircuitStats>,
    pub worker_pool: PoolStats,
    pub message_broker: BrokerStats,
    pub timestamp: DateTime<Utc>,
}

/// `POST /admin/breakers/:name/reset`
#[derive(Debug, Clone, Serialize)]
pub struct BreakerResetResponse {
    pub name: String,
    pub state: CircuitState,
}
