//! Generic repository trait for record access.

use async_trait::async_trait;

use crate::result::Outcome;
use crate::types::predicate::Predicate;

/// Result-typed repository over public records of type `R`.
///
/// Predicates are written against `R`; implementations translate them to
/// their storage shape. Expected conditions (no match, untranslatable
/// predicate, storage fault) come back as [`Outcome::Failure`]. Mutations
/// are staged and only become visible when the owning unit of work
/// commits.
#[async_trait]
pub trait Repository<R>: Send + Sync
where
    R: Send + Sync + 'static,
{
    /// All records matching `predicate`, possibly empty.
    async fn list_by_condition(&self, predicate: &Predicate<R>) -> Outcome<Vec<R>>;

    /// The first matching record; `NotFound` when none match.
    async fn get_by_condition(&self, predicate: &Predicate<R>) -> Outcome<R>;

    /// Stage a new record. The returned record carries no assigned id.
    async fn add(&self, record: R) -> Outcome<R>;

    /// Replace every mutable field of the first match with `record`.
    async fn update(&self, record: R, predicate: &Predicate<R>) -> Outcome<bool>;

    /// Stage deletion of all matches; `NotFound` when none match.
    async fn delete(&self, predicate: &Predicate<R>) -> Outcome<bool>;

    /// Stage deletion of all matches and report how many were found.
    async fn remove_all(&self, predicate: &Predicate<R>) -> Outcome<u64>;
}
