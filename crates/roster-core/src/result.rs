//! Result types for Roster.
//!
//! [`AppResult`] is the escalated form used by services. [`Outcome`] is the
//! envelope returned by repositories and units of work, which never raise
//! for expected conditions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorKind};

/// A specialized `Result` type for Roster operations.
pub type AppResult<T> = Result<T, AppError>;

/// Why an operation did not succeed.
///
/// The message is safe to show to callers; it never carries the text of
/// the underlying storage error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Failure {
    /// The category of failure.
    pub kind: ErrorKind,
    /// A human-readable diagnostic.
    pub message: String,
}

impl Failure {
    /// Create a new failure.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<Failure> for AppError {
    fn from(failure: Failure) -> Self {
        AppError::new(failure.kind, failure.message)
    }
}

/// Success-or-failure envelope returned by the data-access layer.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation succeeded and produced a value.
    Success(T),
    /// The operation failed for an expected reason.
    Failure(Failure),
}

impl<T> Outcome<T> {
    /// Wrap a successful value.
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Build a failure of the given kind.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, message))
    }

    /// Build a `NotFound` failure.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure(ErrorKind::NotFound, message)
    }

    /// Returns `true` for the success case.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for the failure case.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Borrow the failure, if any.
    pub fn failure_ref(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Take the successful value.
    ///
    /// Reading the value of a failure is a programming error and is reported
    /// as [`ErrorKind::InvalidState`], carrying the original message.
    pub fn data(self) -> AppResult<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(AppError::invalid_state(format!(
                "Outcome holds a {} failure and has no data: {}",
                failure.kind, failure.message
            ))),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Map the successful value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Chain another fallible step onto a success.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}
