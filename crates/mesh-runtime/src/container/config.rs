//! # Mesh Configuration
//!
//! Unified configuration for every service and the gateway.
//!
//! All values have defaults; `MESH_*` environment variables override them.
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `MESH_HTTP_PORT` | `8080` | gateway listen port |
//! | `MESH_BREAKER_MAX_FAILURES` | `5` | failures before a breaker opens |
//! | `MESH_BREAKER_TIMEOUT_MS` | `30000` | open-state cool-down |
//! | `MESH_POOL_WORKERS` | `4` | worker tasks |
//! | `MESH_POOL_QUEUE` | `100` | job queue capacity |
//! | `MESH_DELIVERY_TIMEOUT_MS` | `100` | per-subscriber publish bound |
//! | `MESH_ORDER_PROCESSING_MS` | `500` | simulated order processing time |
//! | `MESH_NOTIFICATION_DELAY_MS` | `100` | simulated notification send time |
//! | `MESH_FAILURE_RATE` | `0.0` | injected transient failure probability |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use ms_01_circuit_breaker::CircuitBreakerConfig;
use ms_02_worker_pool::{WorkerPoolConfig, WorkerPoolError};
use ms_05_order_service::OrderServiceConfig;
use ms_06_notification_service::NotificationServiceConfig;
use ms_07_api_gateway::GatewayConfig;
use shared_bus::BrokerConfig;

/// Complete mesh configuration.
#[derive(Debug, Clone, Default)]
pub struct MeshConfig {
    /// HTTP gateway configuration.
    pub gateway: GatewayConfig,
    /// Shared by the three service breakers.
    pub breaker: CircuitBreakerConfig,
    /// Order processing pool.
    pub pool: WorkerPoolConfig,
    /// Message broker tuning.
    pub broker: BrokerConfig,
    pub orders: OrderServiceConfig,
    pub notifications: NotificationServiceConfig,
    /// Probability in `0.0..=1.0` that a guarded operation fails.
    pub failure_rate: f64,
}

impl MeshConfig {
    /// Defaults overridden by the `MESH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "MESH_HTTP_PORT")? {
            config.gateway.http.port = port;
        }
        if let Some(max_failures) = parse_var(&lookup, "MESH_BREAKER_MAX_FAILURES")? {
            config.breaker.max_failures = max_failures;
        }
        if let Some(ms) = parse_var(&lookup, "MESH_BREAKER_TIMEOUT_MS")? {
            config.breaker.timeout = Duration::from_millis(ms);
        }
        if let Some(workers) = parse_var(&lookup, "MESH_POOL_WORKERS")? {
            config.pool.workers = workers;
        }
        if let Some(capacity) = parse_var(&lookup, "MESH_POOL_QUEUE")? {
            config.pool.queue_capacity = capacity;
        }
        if let Some(ms) = parse_var(&lookup, "MESH_DELIVERY_TIMEOUT_MS")? {
            config.broker.delivery_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "MESH_ORDER_PROCESSING_MS")? {
            config.orders.processing_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "MESH_NOTIFICATION_DELAY_MS")? {
            config.notifications.delivery_delay = Duration::from_millis(ms);
        }
        if let Some(rate) = parse_var(&lookup, "MESH_FAILURE_RATE")? {
            config.failure_rate = rate;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway.validate()?;
        self.breaker.validate()?;
        self.pool.validate()?;
        if self.broker.delivery_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "broker delivery timeout cannot be 0".into(),
            ));
        }
        if self.notifications.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification queue capacity cannot be 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::FailureRate(self.failure_rate));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable did not parse.
    #[error("{var}: cannot parse '{value}'")]
    InvalidVar { var: &'static str, value: String },

    #[error("gateway: {0}")]
    Gateway(#[from] ms_07_api_gateway::ConfigError),

    #[error("circuit breaker: {0}")]
    Breaker(#[from] ms_01_circuit_breaker::ConfigError),

    #[error("worker pool: {0}")]
    Pool(#[from] WorkerPoolError),

    #[error("failure rate must be within 0.0..=1.0, got {0}")]
    FailureRate(f64),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
