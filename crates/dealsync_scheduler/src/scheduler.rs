//! Recurring sync job registry.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Error produced by a scheduled job's tick.
pub type JobError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Owns recurring execution of named sync jobs.
///
/// Each scheduled job runs as an independent tokio task that sleeps for
/// its interval, runs the job to completion, and repeats. Must be used
/// from within a tokio runtime.
pub struct SyncScheduler {
    jobs: Mutex<HashMap<String, Arc<Notify>>>,
}

impl SyncScheduler {
    /// Creates a scheduler with no jobs.
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Schedules `job` to run every `interval`, first tick one interval
    /// from now.
    ///
    /// If `job_id` is already registered the prior job is cancelled
    /// first: replace semantics, not stacking. Tick errors are logged and
    /// do not unschedule the job.
    pub fn schedule<F, Fut>(&self, job_id: impl Into<String>, interval: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        let job_id = job_id.into();
        self.cancel(&job_id);

        let cancel = Arc::new(Notify::new());
        let task_cancel = Arc::clone(&cancel);
        let task_id = job_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.notified() => break,
                    () = tokio::time::sleep(interval) => {}
                }
                if let Err(e) = job().await {
                    warn!(job = %task_id, error = %e, "sync job tick failed");
                }
            }
            debug!(job = %task_id, "sync job stopped");
        });

        debug!(job = %job_id, interval_ms = interval.as_millis() as u64, "sync job scheduled");
        self.jobs.lock().insert(job_id, cancel);
    }

    /// Cancels a job's future ticks; a tick already executing finishes.
    ///
    /// Returns whether the job existed.
    pub fn cancel(&self, job_id: &str) -> bool {
        match self.jobs.lock().remove(job_id) {
            Some(cancel) => {
                cancel.notify_one();
                true
            }
            None => false,
        }
    }

    /// Cancels every registered job. Intended for process shutdown.
    pub fn cancel_all(&self) {
        for (job_id, cancel) in self.jobs.lock().drain() {
            debug!(job = %job_id, "cancelling sync job");
            cancel.notify_one();
        }
    }

    /// Returns true if a job with this id is registered.
    pub fn is_scheduled(&self, job_id: &str) -> bool {
        self.jobs.lock().contains_key(job_id)
    }

    /// Number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.lock().len()
    }
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
