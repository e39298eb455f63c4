//! Shared setup for the integration tests and benchmarks.

use std::time::Duration;

use mesh_runtime::{MeshConfig, ServiceContainer};

/// Processing delay used by [`fast_config`].
pub const FAST_PROCESSING: Duration = Duration::from_millis(20);

/// A mesh configuration with short delays and a small pool.
pub fn fast_config() -> MeshConfig {
    let mut config = MeshConfig::default();
    config.pool.workers = 2;
    config.pool.queue_capacity = 16;
    config.breaker.max_failures = 3;
    config.breaker.timeout = Duration::from_millis(100);
    config.broker.delivery_timeout = Duration::from_millis(50);
    config.orders.processing_delay = FAST_PROCESSING;
    config.notifications.delivery_delay = Duration::from_millis(1);
    config
}

/// A started container built from `config`.
pub fn start_mesh(config: MeshConfig) -> ServiceContainer {
    let container = match ServiceContainer::new(config) {
        Ok(container) => container,
        Err(e) => panic!("invalid test configuration: {e}"),
    };
    if let Err(e) = container.start() {
        panic!("failed to start services: {e}");
    }
    container
}

/// Poll `check` until it yields a value, panicking after `limit`.
pub async fn eventually<T, F>(limit: Duration, mut check: F) -> T
where
    F: FnMut() -> Option<T>,
{
    let polled = tokio::time::timeout(limit, async {
        loop {
            if let Some(value) = check() {
                return value;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    match polled {
        Ok(value) => value,
        Err(_) => panic!("condition not met within {limit:?}"),
    }
}
