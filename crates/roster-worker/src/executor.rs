//! Job handler contract.

use async_trait::async_trait;
use serde_json::Value;

use roster_core::error::AppError;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Run the job once, returning an optional summary of what it did
    async fn execute(&self) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// The job could not do its work
    #[error("{0}")]
    Failed(String),

    /// A service call made by the job failed
    #[error("{}", .0.message)]
    Internal(#[from] AppError),
}
