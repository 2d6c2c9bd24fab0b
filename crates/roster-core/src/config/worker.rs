//! Background job configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds to wait for running jobs on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// Periodic purge of old users.
    #[serde(default)]
    pub purge: PurgeJobConfig,
    /// One-shot country import.
    #[serde(default)]
    pub import: ImportJobConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shutdown_grace_seconds: default_shutdown_grace(),
            purge: PurgeJobConfig::default(),
            import: ImportJobConfig::default(),
        }
    }
}

/// Settings for the `purge_old_users` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeJobConfig {
    /// Whether the job is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between runs.
    #[serde(default = "default_purge_interval")]
    pub interval_minutes: u64,
    /// Users strictly older than this are removed.
    #[serde(default = "default_age_threshold")]
    pub age_threshold: i32,
}

impl Default for PurgeJobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_purge_interval(),
            age_threshold: default_age_threshold(),
        }
    }
}

/// Settings for the `import_countries` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJobConfig {
    /// Whether the job is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// CSV file to import.
    #[serde(default = "default_import_path")]
    pub file_path: String,
    /// When to run; immediately on start when absent.
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
}

impl Default for ImportJobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_path: default_import_path(),
            start_at: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_purge_interval() -> u64 {
    5
}

fn default_age_threshold() -> i32 {
    30
}

fn default_import_path() -> String {
    "data/countries.csv".to_string()
}
