//! Job scheduling for Roster.
//!
//! This crate provides:
//! - A scheduler that fires periodic and one-shot jobs, at most one run
//!   per job at a time
//! - The handler contract jobs implement
//! - Built-in jobs that purge old users and import countries

pub mod descriptor;
pub mod executor;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use descriptor::{JobDescriptor, JobState, JobStatus, Trigger};
pub use executor::{JobExecutionError, JobHandler};
pub use runner::{RunHandle, TriggerOutcome};
pub use scheduler::JobScheduler;
