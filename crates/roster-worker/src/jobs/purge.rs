//! Periodic removal of users past an age threshold.

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use roster_service::UserService;

use crate::executor::{JobExecutionError, JobHandler};

/// Removes every user strictly older than the threshold.
#[derive(Debug)]
pub struct PurgeUsersJob {
    /// User service
    users: UserService,
    /// Age above which users are removed
    threshold: i32,
}

impl PurgeUsersJob {
    /// Create a new purge job
    pub fn new(users: UserService, threshold: i32) -> Self {
        Self { users, threshold }
    }
}

#[async_trait]
impl JobHandler for PurgeUsersJob {
    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!(threshold = self.threshold, "Running user purge");

        let removed = self.users.purge_older_than(self.threshold).await?;

        Ok(Some(serde_json::json!({
            "task": "purge_old_users",
            "threshold": self.threshold,
            "removed": removed,
        })))
    }
}
