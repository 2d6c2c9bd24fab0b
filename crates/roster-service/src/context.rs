//! Shared plumbing for service operations.

use std::sync::Arc;

use tracing::warn;

use roster_core::config::{MessageCatalog, ServiceOperation};
use roster_core::error::AppError;
use roster_core::result::{AppResult, Outcome};
use roster_database::{DatabasePool, UnitOfWork};

/// Dependencies every service needs: the pool units of work are opened on
/// and the catalog escalation messages come from.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Database pool.
    db: DatabasePool,
    /// Escalation message templates.
    messages: Arc<MessageCatalog>,
}

impl ServiceContext {
    /// Creates a new service context.
    pub fn new(db: DatabasePool, messages: Arc<MessageCatalog>) -> Self {
        Self { db, messages }
    }

    /// The database pool.
    pub fn db(&self) -> &DatabasePool {
        &self.db
    }

    /// The message catalog.
    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Open a unit of work for one logical operation.
    ///
    /// A session that cannot be opened escalates like any other failed
    /// step of `operation`.
    pub async fn begin(
        &self,
        operation: ServiceOperation,
        entity: &str,
        params: &[(&str, String)],
    ) -> AppResult<UnitOfWork> {
        match UnitOfWork::begin(&self.db).await {
            Outcome::Success(uow) => Ok(uow),
            Outcome::Failure(failure) => {
                Err(self.escalate(operation, entity, params, AppError::from(failure)))
            }
        }
    }

    /// Build the escalation error for a failed step of `operation`.
    pub fn escalate(
        &self,
        operation: ServiceOperation,
        entity: &str,
        params: &[(&str, String)],
        cause: AppError,
    ) -> AppError {
        let message = self.messages.render(operation, entity, params);
        warn!(
            operation = %operation,
            entity,
            kind = %cause.kind,
            cause = %cause.message,
            "{message}"
        );
        AppError::with_source(cause.kind, message, cause)
    }

    /// Finish an operation: commit on success, escalate on failure, and
    /// dispose the unit of work on every path.
    ///
    /// A failed commit escalates with the commit's own message.
    pub async fn complete<T>(
        &self,
        uow: UnitOfWork,
        outcome: Outcome<T>,
        operation: ServiceOperation,
        entity: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let result = match outcome {
            Outcome::Success(value) => match uow.commit().await {
                Outcome::Success(()) => Ok(value),
                Outcome::Failure(failure) => {
                    warn!(operation = %operation, entity, "{}", failure.message);
                    Err(AppError::from(failure))
                }
            },
            Outcome::Failure(failure) => {
                Err(self.escalate(operation, entity, params, AppError::from(failure)))
            }
        };
        uow.dispose().await;
        result
    }
}
