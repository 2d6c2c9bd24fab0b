//! Job descriptors and observable job state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a job fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Immediately on start, then every `interval`.
    Periodic {
        /// Time between firings.
        interval: Duration,
    },
    /// Once, at `start_at` or immediately on start when absent.
    OneShot {
        /// Firing time.
        start_at: Option<DateTime<Utc>>,
    },
}

impl Trigger {
    /// Whether the job retires after its first run.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Self::OneShot { .. })
    }
}

/// A named job and its trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// Unique job name.
    pub name: String,
    /// Firing schedule.
    pub trigger: Trigger,
    /// Put in front of every failure message of this job.
    pub failure_prefix: String,
}

impl JobDescriptor {
    /// A job firing every `interval`.
    pub fn periodic(
        name: impl Into<String>,
        interval: Duration,
        failure_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::Periodic { interval },
            failure_prefix: failure_prefix.into(),
        }
    }

    /// A job firing once.
    pub fn one_shot(
        name: impl Into<String>,
        start_at: Option<DateTime<Utc>>,
        failure_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::OneShot { start_at },
            failure_prefix: failure_prefix.into(),
        }
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Waiting for its next firing.
    Scheduled,
    /// A run is in progress.
    Running,
    /// The last run finished without error.
    Succeeded,
    /// The last run failed or panicked.
    Failed,
    /// A one-shot job that has run; it never fires again.
    Terminal,
}

impl JobState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Terminal => "terminal",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a job's bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Job name.
    pub name: String,
    /// Current state: `Scheduled`, `Running`, or `Terminal`.
    pub state: JobState,
    /// Result of the last finished run: `Succeeded` or `Failed`.
    pub last_outcome: Option<JobState>,
    /// Finished runs.
    pub runs: u64,
    /// Finished runs that failed.
    pub failures: u64,
    /// Firings dropped because a run was still in progress.
    pub skipped: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
    /// Summary returned by the most recent successful run.
    pub last_result: Option<Value>,
    /// When the most recent run started.
    pub last_started_at: Option<DateTime<Utc>>,
    /// When the most recent run finished.
    pub last_finished_at: Option<DateTime<Utc>>,
}

impl JobStatus {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: JobState::Scheduled,
            last_outcome: None,
            runs: 0,
            failures: 0,
            skipped: 0,
            last_error: None,
            last_result: None,
            last_started_at: None,
            last_finished_at: None,
        }
    }
}
