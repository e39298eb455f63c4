//! Pool domain types.

pub mod config;
pub mod error;
pub mod job;

pub use config::{PoolStats, WorkerPoolConfig};
pub use error::{JobError, WorkerPoolError};
pub use job::{BoxError, Job, JobHandle, JobId};
