//! Pool and job errors.

use thiserror::Error;

/// Errors returned by pool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerPoolError {
    /// The pool was stopped; no further jobs are accepted.
    #[error("worker pool is stopped")]
    Stopped,

    /// `start` was called on a pool that is already running.
    #[error("worker pool already started")]
    AlreadyStarted,

    /// The queue is at capacity (non-blocking submit only).
    #[error("worker pool queue is full")]
    QueueFull,

    #[error("invalid worker pool configuration: {0}")]
    InvalidConfig(String),
}

/// Outcome of a job that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The task returned an error.
    #[error("job failed: {0}")]
    Failed(String),

    /// The task panicked; the worker recovered.
    #[error("job panicked: {0}")]
    Panicked(String),

    /// The job was never run (pool stopped or queue rejected it).
    #[error("job abandoned before execution")]
    Abandoned,
}
