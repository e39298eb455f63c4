//! Jobs and their result handles.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;

use super::error::JobError;

/// Job identifier, chosen by the submitter.
pub type JobId = u64;

/// Error type a task may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Task = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>;

/// A unit of work.
///
/// Consumed exactly once, by the worker that runs it or by the pool when
/// it is abandoned.
pub struct Job {
    id: JobId,
    task: Task,
    result_tx: oneshot::Sender<Result<(), JobError>>,
}

impl Job {
    /// Create a job and the handle that will receive its outcome.
    pub fn new<F, Fut>(id: JobId, task: F) -> (Self, JobHandle)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job = Self {
            id,
            task: Box::new(move || task().boxed()),
            result_tx,
        };
        (job, JobHandle { id, result_rx })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub(crate) fn into_parts(self) -> (JobId, Task, oneshot::Sender<Result<(), JobError>>) {
        (self.id, self.task, self.result_tx)
    }

    /// Resolve the handle without running the task.
    pub(crate) fn abandon(self) {
        let _ = self.result_tx.send(Err(JobError::Abandoned));
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("id", &self.id).finish()
    }
}

/// Receives the single outcome of a [`Job`].
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    result_rx: oneshot::Receiver<Result<(), JobError>>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the job to finish.
    ///
    /// A job dropped without running resolves to [`JobError::Abandoned`].
    pub async fn wait(self) -> Result<(), JobError> {
        self.result_rx.await.unwrap_or(Err(JobError::Abandoned))
    }
}
