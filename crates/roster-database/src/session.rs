//! Storage session: one pooled connection plus the changes staged on it.

use sqlx::pool::PoolConnection;
use sqlx::{Connection, Sqlite, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use roster_core::error::AppError;
use roster_core::types::{Condition, FilterValue};
use roster_entity::{Reference, StoredEntity};

use crate::sql;

/// A write recorded by a repository and replayed on commit.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedMutation {
    /// Insert a new row.
    Insert {
        /// Target table.
        table: &'static str,
        /// Column values.
        values: Vec<(&'static str, FilterValue)>,
    },
    /// Overwrite every writable column of an existing row.
    Replace {
        /// Target table.
        table: &'static str,
        /// Row to overwrite.
        id: i64,
        /// Column values.
        values: Vec<(&'static str, FilterValue)>,
    },
    /// Delete rows by id.
    Delete {
        /// Target table.
        table: &'static str,
        /// Rows to delete.
        ids: Vec<i64>,
    },
}

impl StagedMutation {
    async fn apply(&self, conn: &mut sqlx::SqliteConnection) -> Result<u64, sqlx::Error> {
        let mut qb = match self {
            Self::Insert { table, values } => sql::insert(table, values),
            Self::Replace { table, id, values } => sql::replace(table, *id, values),
            Self::Delete { table, ids } => sql::delete(table, ids),
        };
        let result = qb.build().execute(conn).await?;
        Ok(result.rows_affected())
    }
}

/// Why a session call did not complete.
#[derive(Debug)]
pub enum SessionError {
    /// The session was disposed.
    Closed,
    /// The condition cannot be expressed in SQL.
    Unsupported(AppError),
    /// The database reported an error.
    Storage(sqlx::Error),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err)
    }
}

#[derive(Debug)]
struct SessionState {
    connection: Option<PoolConnection<Sqlite>>,
    staged: Vec<StagedMutation>,
}

/// Exclusive owner of one pooled connection.
///
/// Reads run directly on the connection. Writes are staged and only reach
/// the database through [`Session::flush`], inside a single transaction.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Acquire a connection from the pool.
    pub async fn open(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let connection = pool.acquire().await?;
        Ok(Self {
            state: Mutex::new(SessionState {
                connection: Some(connection),
                staged: Vec::new(),
            }),
        })
    }

    /// Load every row of `E` matching a storage condition, ordered by id.
    pub async fn fetch<E: StoredEntity>(
        &self,
        condition: &Condition,
    ) -> Result<Vec<E>, SessionError> {
        let mut qb = sql::select::<E>(condition).map_err(SessionError::Unsupported)?;

        let mut state = self.state.lock().await;
        let conn = state.connection.as_mut().ok_or(SessionError::Closed)?;
        debug!(entity = E::KIND, sql = qb.sql(), "Fetching rows");
        let rows = qb.build_query_as::<E>().fetch_all(&mut **conn).await?;
        Ok(rows)
    }

    /// Load the first row of `E` matching a storage condition, by id.
    pub async fn fetch_first<E: StoredEntity>(
        &self,
        condition: &Condition,
    ) -> Result<Option<E>, SessionError> {
        let mut qb = sql::select_first::<E>(condition).map_err(SessionError::Unsupported)?;

        let mut state = self.state.lock().await;
        let conn = state.connection.as_mut().ok_or(SessionError::Closed)?;
        debug!(entity = E::KIND, sql = qb.sql(), "Fetching first row");
        let row = qb.build_query_as::<E>().fetch_optional(&mut **conn).await?;
        Ok(row)
    }

    /// Resolve a reference to the id of an existing row.
    pub async fn lookup(&self, reference: &Reference) -> Result<Option<i64>, SessionError> {
        let mut qb = sql::lookup(reference);

        let mut state = self.state.lock().await;
        let conn = state.connection.as_mut().ok_or(SessionError::Closed)?;
        let id = qb
            .build_query_scalar::<i64>()
            .fetch_optional(&mut **conn)
            .await?;
        Ok(id)
    }

    /// Record a mutation for the next flush.
    pub async fn stage(&self, mutation: StagedMutation) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        if state.connection.is_none() {
            return Err(SessionError::Closed);
        }
        state.staged.push(mutation);
        Ok(())
    }

    /// Number of staged mutations.
    pub async fn pending(&self) -> usize {
        self.state.lock().await.staged.len()
    }

    /// Replay all staged mutations in order inside one transaction.
    ///
    /// The staged set is emptied whether or not the transaction commits.
    pub async fn flush(&self) -> Result<usize, SessionError> {
        let mut state = self.state.lock().await;
        let SessionState { connection, staged } = &mut *state;
        let conn = connection.as_mut().ok_or(SessionError::Closed)?;

        let mutations = std::mem::take(staged);
        if mutations.is_empty() {
            return Ok(0);
        }

        let mut tx = Connection::begin(&mut **conn).await?;
        for (index, mutation) in mutations.iter().enumerate() {
            if let Err(e) = mutation.apply(&mut *tx).await {
                warn!(index, error = %e, "Staged mutation failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                return Err(SessionError::Storage(e));
            }
        }
        tx.commit().await?;

        debug!(mutations = mutations.len(), "Session flushed");
        Ok(mutations.len())
    }

    /// Drop staged changes and return the connection to the pool.
    ///
    /// Returns `true` only for the call that released the connection.
    pub async fn dispose(&self) -> bool {
        let mut state = self.state.lock().await;
        state.staged.clear();
        state.connection.take().is_some()
    }

    /// Whether [`Session::dispose`] has run.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.connection.is_none()
    }
}
