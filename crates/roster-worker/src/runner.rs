//! Running a single job: the run lock, panic capture, and bookkeeping.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing;

use roster_core::error::{AppError, ErrorKind};

use crate::descriptor::{JobDescriptor, JobState, JobStatus};
use crate::executor::{JobExecutionError, JobHandler};

/// Result of asking a job to fire.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A run was started.
    Started(RunHandle),
    /// A run was already in progress; this firing was dropped.
    AlreadyRunning,
    /// The job is a one-shot that has already run.
    Terminal,
}

/// Handle to a started run.
#[derive(Debug)]
pub struct RunHandle(JoinHandle<JobState>);

impl RunHandle {
    /// Wait for the run to finish; yields `Succeeded` or `Failed`.
    pub async fn wait(self) -> JobState {
        self.0.await.unwrap_or(JobState::Failed)
    }
}

/// A registered job with its handler and bookkeeping.
#[derive(Debug)]
pub(crate) struct JobSlot {
    descriptor: JobDescriptor,
    handler: Arc<dyn JobHandler>,
    status: Mutex<JobStatus>,
}

impl JobSlot {
    pub(crate) fn new(descriptor: JobDescriptor, handler: Arc<dyn JobHandler>) -> Self {
        let status = Mutex::new(JobStatus::new(&descriptor.name));
        Self {
            descriptor,
            handler,
            status,
        }
    }

    pub(crate) fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    pub(crate) fn status(&self) -> JobStatus {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, JobStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the run lock and spawn a run on `tracker`.
    pub(crate) fn fire(self: &Arc<Self>, tracker: &TaskTracker) -> TriggerOutcome {
        {
            let mut status = self.lock();
            match status.state {
                JobState::Terminal => return TriggerOutcome::Terminal,
                JobState::Running => {
                    status.skipped += 1;
                    tracing::warn!(
                        job = %self.descriptor.name,
                        skipped = status.skipped,
                        "Previous run still in progress, skipping this firing"
                    );
                    return TriggerOutcome::AlreadyRunning;
                }
                _ => {
                    status.state = JobState::Running;
                    status.last_started_at = Some(Utc::now());
                }
            }
        }

        let slot = Arc::clone(self);
        TriggerOutcome::Started(RunHandle(tracker.spawn(async move { slot.run().await })))
    }

    async fn run(&self) -> JobState {
        let name = &self.descriptor.name;
        tracing::info!(job = %name, "Job started");

        let result = AssertUnwindSafe(self.handler.execute()).catch_unwind().await;
        let result = match result {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(e)) => Err(self.wrap(e)),
            Err(panic) => Err(self.wrap_panic(panic)),
        };

        let mut status = self.lock();
        status.runs += 1;
        status.last_finished_at = Some(Utc::now());
        status.state = if self.descriptor.trigger.is_one_shot() {
            JobState::Terminal
        } else {
            JobState::Scheduled
        };

        let outcome = match result {
            Ok(summary) => {
                tracing::info!(job = %name, runs = status.runs, "Job completed successfully");
                status.last_result = summary;
                JobState::Succeeded
            }
            Err(err) => {
                status.failures += 1;
                tracing::error!(
                    job = %name,
                    failures = status.failures,
                    cause = ?std::error::Error::source(&err).map(|e| e.to_string()),
                    "{}",
                    err.message
                );
                status.last_error = Some(err.message);
                JobState::Failed
            }
        };
        status.last_outcome = Some(outcome);
        outcome
    }

    fn wrap(&self, err: JobExecutionError) -> AppError {
        let message = format!("{} {err}", self.descriptor.failure_prefix);
        AppError::with_source(ErrorKind::JobExecutionFailed, message, err)
    }

    fn wrap_panic(&self, panic: Box<dyn Any + Send>) -> AppError {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        AppError::new(
            ErrorKind::JobExecutionFailed,
            format!("{} job panicked: {detail}", self.descriptor.failure_prefix),
        )
    }
}
