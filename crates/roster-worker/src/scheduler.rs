//! Scheduler that fires registered jobs on their triggers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::task::TaskTracker;
use tracing;

use roster_core::error::AppError;
use roster_core::result::AppResult;

use crate::descriptor::{JobDescriptor, JobStatus, Trigger};
use crate::executor::JobHandler;
use crate::runner::{JobSlot, TriggerOutcome};

/// Fires periodic and one-shot jobs.
///
/// Each job has its own run lock: a firing that arrives while the previous
/// run is still in progress is dropped and counted as skipped. Different
/// jobs run concurrently. A failing or panicking job is logged and
/// recorded; it never stops the scheduler or the job's future firings.
#[derive(Debug)]
pub struct JobScheduler {
    /// Registered jobs by name
    jobs: RwLock<HashMap<String, Arc<JobSlot>>>,
    /// Set once `start` has run
    started: AtomicBool,
    /// Set once `shutdown` has run
    stopped: AtomicBool,
    /// Broadcasts the shutdown signal to trigger drivers
    shutdown: watch::Sender<bool>,
    /// Tracks trigger drivers and job runs
    tracker: TaskTracker,
    /// How long `shutdown` waits for running jobs
    grace: Duration,
}

impl JobScheduler {
    /// Create a scheduler that waits up to `grace` for running jobs on
    /// shutdown.
    pub fn new(grace: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            jobs: RwLock::new(HashMap::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            shutdown,
            tracker: TaskTracker::new(),
            grace,
        }
    }

    /// Register a job. Names are unique; registration closes on `start`.
    pub fn register(
        &self,
        descriptor: JobDescriptor,
        handler: Arc<dyn JobHandler>,
    ) -> AppResult<()> {
        if self.started.load(Ordering::SeqCst) {
            return Err(AppError::invalid_state(format!(
                "Cannot register job '{}' after the scheduler has started",
                descriptor.name
            )));
        }
        if descriptor.name.trim().is_empty() {
            return Err(AppError::validation("Job name must not be empty"));
        }
        if let Trigger::Periodic { interval } = descriptor.trigger {
            if interval.is_zero() {
                return Err(AppError::validation(format!(
                    "Job '{}' has a zero interval",
                    descriptor.name
                )));
            }
        }

        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(&descriptor.name) {
            return Err(AppError::validation(format!(
                "Job '{}' is already registered",
                descriptor.name
            )));
        }

        tracing::info!(job = %descriptor.name, trigger = ?descriptor.trigger, "Registered job");
        let name = descriptor.name.clone();
        jobs.insert(name, Arc::new(JobSlot::new(descriptor, handler)));
        Ok(())
    }

    /// Start a trigger driver for every registered job.
    pub fn start(&self) -> AppResult<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(AppError::invalid_state("The scheduler has been shut down"));
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AppError::invalid_state("The scheduler is already running"));
        }

        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        for slot in jobs.values() {
            let slot = Arc::clone(slot);
            let shutdown = self.shutdown.subscribe();
            let tracker = self.tracker.clone();
            let trigger = slot.descriptor().trigger.clone();
            match trigger {
                Trigger::Periodic { interval } => {
                    self.tracker
                        .spawn(drive_periodic(slot, interval, shutdown, tracker));
                }
                Trigger::OneShot { start_at } => {
                    let delay = start_at
                        .and_then(|at| (at - Utc::now()).to_std().ok())
                        .unwrap_or(Duration::ZERO);
                    self.tracker
                        .spawn(drive_one_shot(slot, delay, shutdown, tracker));
                }
            }
        }

        tracing::info!(jobs = jobs.len(), "Job scheduler started");
        Ok(())
    }

    /// Fire a job now, outside its trigger.
    pub fn trigger(&self, name: &str) -> AppResult<TriggerOutcome> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(AppError::invalid_state("The scheduler has been shut down"));
        }
        let slot = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Job '{name}' is not registered")))?;
        Ok(slot.fire(&self.tracker))
    }

    /// Snapshot of one job's state.
    pub fn status(&self, name: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|slot| slot.status())
    }

    /// Snapshots of every job, ordered by name.
    pub fn statuses(&self) -> Vec<JobStatus> {
        let mut statuses: Vec<JobStatus> = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|slot| slot.status())
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Stop all triggers and wait up to the grace period for running jobs.
    pub async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Job scheduler shutting down...");

        self.shutdown.send_replace(true);
        self.tracker.close();

        if time::timeout(self.grace, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                grace_seconds = self.grace.as_secs(),
                "Jobs still running after the grace period"
            );
        }
        tracing::info!("Job scheduler shut down");
    }
}

async fn drive_periodic(
    slot: Arc<JobSlot>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    tracker: TaskTracker,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                if *shutdown.borrow() {
                    break;
                }
                slot.fire(&tracker);
            }
        }
    }
    tracing::debug!(job = %slot.descriptor().name, "Periodic trigger stopped");
}

async fn drive_one_shot(
    slot: Arc<JobSlot>,
    delay: Duration,
    mut shutdown: watch::Receiver<bool>,
    tracker: TaskTracker,
) {
    tokio::select! {
        _ = shutdown.changed() => {
            tracing::debug!(job = %slot.descriptor().name, "One-shot trigger cancelled");
        }
        _ = time::sleep(delay) => {
            slot.fire(&tracker);
        }
    }
}
