//! Unified application error types for Roster.
//!
//! Repositories and units of work report expected conditions through
//! [`Outcome`](crate::result::Outcome). Only the service layer, start-up
//! code, and the job scheduler raise [`AppError`].

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No record matched the condition.
    NotFound,
    /// A predicate could not be translated to the storage shape.
    TranslationUnsupported,
    /// A record refers to another record that does not exist.
    ReferenceNotFound,
    /// The backing store failed while reading or writing.
    StorageFault,
    /// The storage session was already disposed.
    SessionClosed,
    /// A scheduled job failed.
    JobExecutionFailed,
    /// A value was read from an envelope in the wrong state.
    InvalidState,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// The database could not be reached or migrated.
    Database,
    /// A file system error occurred.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::TranslationUnsupported => write!(f, "TRANSLATION_UNSUPPORTED"),
            Self::ReferenceNotFound => write!(f, "REFERENCE_NOT_FOUND"),
            Self::StorageFault => write!(f, "STORAGE_FAULT"),
            Self::SessionClosed => write!(f, "SESSION_CLOSED"),
            Self::JobExecutionFailed => write!(f, "JOB_EXECUTION_FAILED"),
            Self::InvalidState => write!(f, "INVALID_STATE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Io => write!(f, "IO"),
        }
    }
}

/// The unified application error used throughout Roster.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a translation error for an unsupported predicate.
    pub fn translation_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TranslationUnsupported, message)
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found("Item not found.");
        assert_eq!(err.to_string(), "NOT_FOUND: Item not found.");
    }
}
