//! The worker pool and its dispatcher.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{
    BoxError, Job, JobError, JobHandle, PoolStats, WorkerPoolConfig, WorkerPoolError,
};

type ReadyWorker = mpsc::Sender<Job>;

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
    running: AtomicUsize,
}

/// Bounded pool of long-lived workers.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    queue_tx: mpsc::Sender<Job>,
    /// Held until `start` hands it to the dispatcher.
    queue_rx: Mutex<Option<mpsc::Receiver<Job>>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
    stopped: AtomicBool,
    next_job_id: AtomicU64,
    counters: Arc<Counters>,
}

impl WorkerPool {
    /// Create a pool. Nothing runs until [`start`](Self::start).
    pub fn new(config: WorkerPoolConfig) -> Result<Self, WorkerPoolError> {
        config.validate()?;
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            next_job_id: AtomicU64::new(1),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Spawn the workers and the dispatcher onto the current runtime.
    pub fn start(&self) -> Result<(), WorkerPoolError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(WorkerPoolError::Stopped);
        }
        let queue_rx = self
            .queue_rx
            .lock()
            .take()
            .ok_or(WorkerPoolError::AlreadyStarted)?;

        let (ready_tx, ready_rx) = mpsc::channel::<ReadyWorker>(self.config.workers);
        let mut tasks = self.tasks.lock();

        for worker_id in 0..self.config.workers {
            tasks.push(tokio::spawn(run_worker(
                worker_id,
                ready_tx.clone(),
                self.shutdown_tx.subscribe(),
                Arc::clone(&self.counters),
            )));
        }
        tasks.push(tokio::spawn(dispatch(
            queue_rx,
            ready_rx,
            self.shutdown_tx.subscribe(),
        )));

        self.started.store(true, Ordering::SeqCst);
        info!(
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            "Worker pool started"
        );
        Ok(())
    }

    /// Enqueue `job`, waiting for queue space when the queue is full.
    ///
    /// Returns [`WorkerPoolError::Stopped`] once the pool has been stopped;
    /// the job's handle then resolves to [`JobError::Abandoned`].
    pub async fn submit(&self, job: Job) -> Result<(), WorkerPoolError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(WorkerPoolError::Stopped);
        }
        let job_id = job.id();
        self.queue_tx
            .send(job)
            .await
            .map_err(|_| WorkerPoolError::Stopped)?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(job_id, "Job queued");
        Ok(())
    }

    /// Enqueue without waiting.
    ///
    /// On `QueueFull` or `Stopped` the job is dropped and its handle resolves
    /// to [`JobError::Abandoned`].
    pub fn try_submit(&self, job: Job) -> Result<(), WorkerPoolError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(WorkerPoolError::Stopped);
        }
        match self.queue_tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(WorkerPoolError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(WorkerPoolError::Stopped),
        }
    }

    /// Wrap `task` in a job with a pool-assigned id and submit it.
    pub async fn spawn<F, Fut>(&self, task: F) -> Result<JobHandle, WorkerPoolError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let (job, handle) = Job::new(id, task);
        self.submit(job).await?;
        Ok(handle)
    }

    /// Signal shutdown and wait for every worker and the dispatcher to exit.
    ///
    /// Running jobs complete; undispatched jobs are abandoned. Repeated calls
    /// return immediately.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Stopping worker pool");
        self.shutdown_tx.send_replace(true);

        // Never started: the queue is still ours to drain.
        if let Some(queue_rx) = self.queue_rx.lock().take() {
            abandon_queued(queue_rx);
        }

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Worker pool task terminated abnormally");
            }
        }
        info!("Worker pool stopped");
    }

    /// Whether the pool has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.config.workers,
            queue_capacity: self.config.queue_capacity,
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
            running: self.counters.running.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Pair queued jobs with ready workers until shutdown.
async fn dispatch(
    mut queue: mpsc::Receiver<Job>,
    mut ready: mpsc::Receiver<ReadyWorker>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.wait_for(|stop| *stop) => break,
            job = queue.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let worker = tokio::select! {
            biased;
            _ = shutdown.wait_for(|stop| *stop) => {
                job.abandon();
                break;
            }
            worker = ready.recv() => match worker {
                Some(worker) => worker,
                None => {
                    job.abandon();
                    break;
                }
            },
        };

        debug!(job_id = job.id(), "Dispatching job");
        if let Err(mpsc::error::SendError(job)) = worker.send(job).await {
            warn!(job_id = job.id(), "Worker went away before accepting job");
            job.abandon();
        }
    }

    abandon_queued(queue);
    debug!("Dispatcher stopped");
}

/// Resolve every job still in the queue as abandoned.
fn abandon_queued(mut queue: mpsc::Receiver<Job>) {
    queue.close();
    let mut abandoned = 0usize;
    while let Ok(job) = queue.try_recv() {
        job.abandon();
        abandoned += 1;
    }
    if abandoned > 0 {
        info!(abandoned, "Abandoned queued jobs at shutdown");
    }
}

async fn run_worker(
    worker_id: usize,
    ready: mpsc::Sender<ReadyWorker>,
    mut shutdown: watch::Receiver<bool>,
    counters: Arc<Counters>,
) {
    let (job_tx, mut job_rx) = mpsc::channel::<Job>(1);
    debug!(worker_id, "Worker started");

    loop {
        if ready.send(job_tx.clone()).await.is_err() {
            break;
        }

        // A job already handed over runs even if shutdown is raised.
        let job = tokio::select! {
            biased;
            job = job_rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        run_job(worker_id, job, &counters).await;
    }

    job_rx.close();
    while let Ok(job) = job_rx.try_recv() {
        job.abandon();
    }
    debug!(worker_id, "Worker stopped");
}

async fn run_job(worker_id: usize, job: Job, counters: &Counters) {
    let (job_id, task, result_tx) = job.into_parts();
    counters.running.fetch_add(1, Ordering::Relaxed);

    let outcome = AssertUnwindSafe(async move { task().await })
        .catch_unwind()
        .await;

    counters.running.fetch_sub(1, Ordering::Relaxed);

    let result = match outcome {
        Ok(Ok(())) => {
            counters.completed.fetch_add(1, Ordering::Relaxed);
            debug!(worker_id, job_id, "Job completed");
            Ok(())
        }
        Ok(Err(e)) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(worker_id, job_id, error = %e, "Job failed");
            Err(JobError::Failed(e.to_string()))
        }
        Err(panic) => {
            counters.panicked.fetch_add(1, Ordering::Relaxed);
            let message = panic_message(panic.as_ref());
            error!(worker_id, job_id, panic = %message, "Job panicked");
            Err(JobError::Panicked(message))
        }
    };

    if result_tx.send(result).is_err() {
        debug!(worker_id, job_id, "Job handle dropped, discarding result");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
