//! Bounded-concurrency FIFO job scheduler.
//!
//! Jobs are queued on an unbounded channel and started in submission order by
//! a single dispatcher task, at most `concurrency` at a time. Every failure
//! mode of a job (error, panic, timeout) is absorbed here: it is logged and
//! counted, and the queue keeps going.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, error, warn};

use crate::metrics;

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Jobs allowed to run at once (at least 1).
    pub concurrency: usize,
    /// Per-job time limit. A job that exceeds it is dropped and counted as failed.
    pub job_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            job_timeout: None,
        }
    }
}

/// Snapshot of scheduler activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub concurrency: usize,
    /// Jobs waiting for a slot.
    pub queued: u64,
    /// Jobs currently running.
    pub active: u64,
    pub total_completed: u64,
    pub total_failed: u64,
}

struct QueuedJob {
    label: String,
    future: BoxFuture<'static, Result<(), String>>,
}

/// Tracks statistics for the scheduler.
#[derive(Default)]
struct SchedulerStats {
    queued: AtomicU64,
    active: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

struct Shared {
    stats: SchedulerStats,
    /// Jobs enqueued but not yet finished.
    outstanding: watch::Sender<usize>,
    job_timeout: Option<Duration>,
}

/// Runs crawl jobs in FIFO order under a concurrency limit.
///
/// Must be created inside a tokio runtime. Cloning yields another handle to
/// the same queue.
#[derive(Clone)]
pub struct JobScheduler {
    concurrency: usize,
    tx: mpsc::UnboundedSender<QueuedJob>,
    shared: Arc<Shared>,
}

impl JobScheduler {
    /// Create a scheduler and spawn its dispatcher task.
    pub fn new(config: SchedulerConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0usize);

        let shared = Arc::new(Shared {
            stats: SchedulerStats::default(),
            outstanding,
            job_timeout: config.job_timeout,
        });

        let semaphore = Arc::new(Semaphore::new(concurrency));
        tokio::spawn(dispatch(rx, semaphore, Arc::clone(&shared)));

        Self {
            concurrency,
            tx,
            shared,
        }
    }

    /// Queue a job. Never blocks; the job starts once every earlier job has
    /// started and a slot is free.
    pub fn enqueue<F, E>(&self, label: impl Into<String>, job: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let label = label.into();
        let future = async move { job.await.map_err(|e| e.to_string()) }.boxed();

        self.shared.outstanding.send_modify(|n| *n += 1);
        self.shared.stats.queued.fetch_add(1, Ordering::Relaxed);

        if let Err(mpsc::error::SendError(job)) = self.tx.send(QueuedJob { label, future }) {
            // Dispatcher is gone; undo the bookkeeping so drain() cannot hang.
            error!(job = %job.label, "Scheduler dispatcher stopped, dropping job");
            self.shared.stats.queued.fetch_sub(1, Ordering::Relaxed);
            self.shared.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            self.shared.outstanding.send_modify(|n| *n -= 1);
        }
    }

    /// Wait until every job enqueued so far has finished.
    pub async fn drain(&self) {
        let mut rx = self.shared.outstanding.subscribe();
        // The sender lives in `shared`, which we hold, so this cannot error.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Jobs enqueued but not finished.
    pub fn outstanding(&self) -> usize {
        *self.shared.outstanding.borrow()
    }

    pub fn status(&self) -> SchedulerStatus {
        let stats = &self.shared.stats;
        SchedulerStatus {
            concurrency: self.concurrency,
            queued: stats.queued.load(Ordering::Relaxed),
            active: stats.active.load(Ordering::Relaxed),
            total_completed: stats.total_completed.load(Ordering::Relaxed),
            total_failed: stats.total_failed.load(Ordering::Relaxed),
        }
    }
}

async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<QueuedJob>,
    semaphore: Arc<Semaphore>,
    shared: Arc<Shared>,
) {
    while let Some(job) = rx.recv().await {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        shared.stats.queued.fetch_sub(1, Ordering::Relaxed);
        shared.stats.active.fetch_add(1, Ordering::Relaxed);

        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            let _permit = permit;
            run_job(job, &shared).await;
            shared.stats.active.fetch_sub(1, Ordering::Relaxed);
            shared.outstanding.send_modify(|n| *n -= 1);
        });
    }
    debug!("Scheduler dispatcher stopped");
}

async fn run_job(job: QueuedJob, shared: &Shared) {
    let QueuedJob { label, future } = job;
    let start = Instant::now();
    let guarded = AssertUnwindSafe(future).catch_unwind();

    let result = match shared.job_timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(result) => Some(result),
            Err(_) => None,
        },
        None => Some(guarded.await),
    };

    let failure_kind = match result {
        Some(Ok(Ok(()))) => None,
        Some(Ok(Err(e))) => {
            warn!(job = %label, error = %e, "Crawl job failed");
            Some("error")
        }
        Some(Err(panic)) => {
            error!(job = %label, panic = %panic_message(&*panic), "Crawl job panicked");
            Some("panic")
        }
        None => {
            warn!(job = %label, timeout = ?shared.job_timeout, "Crawl job timed out");
            Some("timeout")
        }
    };

    let elapsed = start.elapsed().as_secs_f64();
    match failure_kind {
        None => {
            shared.stats.total_completed.fetch_add(1, Ordering::Relaxed);
            metrics::JOB_DURATION
                .with_label_values(&["success"])
                .observe(elapsed);
        }
        Some(kind) => {
            shared.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            metrics::JOB_FAILURES.with_label_values(&[kind]).inc();
            metrics::JOB_DURATION
                .with_label_values(&["failure"])
                .observe(elapsed);
        }
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
