//! Storage-side record contract.

use roster_core::types::{FieldSource, FilterValue};
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

/// A row type persisted by the database layer.
///
/// `SELECT` must yield the columns [`FromRow`] expects, with related
/// records joined in. Field paths used in storage predicates resolve to
/// SQL expressions through [`StoredEntity::column`].
pub trait StoredEntity:
    for<'r> FromRow<'r, SqliteRow> + FieldSource + Send + Sync + Unpin + 'static
{
    /// Entity name used in messages and logs.
    const KIND: &'static str;
    /// Table that owns the rows.
    const TABLE: &'static str;
    /// Base query, without `WHERE` or `ORDER BY`.
    const SELECT: &'static str;
    /// Qualified primary key expression used for ordering.
    const ORDER_BY: &'static str;

    /// SQL expression for a storage field path.
    fn column(path: &str) -> Option<&'static str>;

    /// Primary key.
    fn id(&self) -> i64;

    /// Writable columns and their values, primary key excluded.
    fn values(&self) -> Vec<(&'static str, FilterValue)>;
}
