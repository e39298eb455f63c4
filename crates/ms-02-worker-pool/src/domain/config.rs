//! Pool configuration and statistics.

use serde::Serialize;

use super::error::WorkerPoolError;

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default job queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Number of long-lived workers.
    pub workers: usize,
    /// Jobs that may wait for a worker before `submit` applies backpressure.
    pub queue_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerPoolConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), WorkerPoolError> {
        if self.workers == 0 {
            return Err(WorkerPoolError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(WorkerPoolError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time pool counters, as exposed on the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Jobs accepted into the queue.
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub panicked: u64,
    /// Jobs executing right now.
    pub running: usize,
}
