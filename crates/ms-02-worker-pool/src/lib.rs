//! # Worker Pool
//!
//! A fixed set of workers fed by a bounded job queue.
//!
//! ## Dispatch
//!
//! ```text
//!  submit() ──► [ bounded queue ] ──► dispatcher ──► ready worker's channel (cap 1)
//!                                         ▲                    │
//!                                         └── ready workers ◄──┘ (re-registers after each job)
//! ```
//!
//! Every worker owns a private channel of capacity one and registers a
//! sender for it in the shared ready channel whenever it is idle. The
//! dispatcher pulls one queued job, waits for one ready worker and hands the
//! job over, so a job reaches exactly one worker and a worker never holds
//! more than one job.
//!
//! ## Results
//!
//! Each job carries a oneshot sender; its [`JobHandle`] resolves exactly
//! once with the task's outcome. Panics are caught at the worker boundary and
//! reported as [`JobError::Panicked`]; the worker keeps serving.
//!
//! ## Shutdown
//!
//! [`WorkerPool::stop`] raises a watch signal and joins every task. Running
//! jobs finish; jobs still queued resolve to [`JobError::Abandoned`]. Any
//! later submit returns [`WorkerPoolError::Stopped`].

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod pool;

pub use domain::{
    BoxError, Job, JobError, JobHandle, JobId, PoolStats, WorkerPoolConfig, WorkerPoolError,
};
pub use pool::WorkerPool;
