//! Unit of work: one storage session shared by a fixed set of repositories.

use tracing::{debug, error};

use roster_core::config::ReferencePolicy;
use roster_core::error::ErrorKind;
use roster_core::result::Outcome;

use crate::connection::DatabasePool;
use crate::repositories::messages;
use crate::repositories::{CountryRepository, UserRepository};
use crate::session::{Session, SessionError};

/// Owns one storage session for the duration of a logical operation.
///
/// Repositories borrow the session and stage their writes on it;
/// [`UnitOfWork::commit`] applies them atomically. After
/// [`UnitOfWork::dispose`] every call reports `SessionClosed`.
#[derive(Debug)]
pub struct UnitOfWork {
    session: Session,
    policy: ReferencePolicy,
}

impl UnitOfWork {
    /// Acquire a connection and open a session on it.
    ///
    /// A pool that cannot hand out a connection is a `StorageFault`; the
    /// driver's text is logged, never returned.
    pub async fn begin(db: &DatabasePool) -> Outcome<Self> {
        match Session::open(db.pool()).await {
            Ok(session) => Outcome::success(Self {
                session,
                policy: db.reference_policy(),
            }),
            Err(e) => {
                error!(error = %e, "Failed to open storage session");
                Outcome::failure(ErrorKind::StorageFault, messages::SESSION_OPEN_FAILED)
            }
        }
    }

    /// Repository over users.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.session, self.policy)
    }

    /// Repository over countries.
    pub fn countries(&self) -> CountryRepository<'_> {
        CountryRepository::new(&self.session, self.policy)
    }

    /// Number of staged mutations not yet committed.
    pub async fn pending_changes(&self) -> usize {
        self.session.pending().await
    }

    /// Apply every staged mutation in one transaction.
    ///
    /// On failure nothing is applied and the staged set is discarded.
    pub async fn commit(&self) -> Outcome<()> {
        match self.session.flush().await {
            Ok(applied) => {
                debug!(applied, "Unit of work committed");
                Outcome::success(())
            }
            Err(SessionError::Closed) => {
                Outcome::failure(ErrorKind::SessionClosed, messages::SESSION_CLOSED)
            }
            Err(SessionError::Storage(e)) => {
                error!(error = %e, "Commit failed");
                Outcome::failure(ErrorKind::StorageFault, messages::SAVE_FAILED)
            }
            Err(SessionError::Unsupported(e)) => {
                error!(error = %e, "Commit failed");
                Outcome::failure(ErrorKind::StorageFault, messages::SAVE_FAILED)
            }
        }
    }

    /// Release the session. Safe to call more than once; only the call that
    /// actually released it returns `true`.
    pub async fn dispose(&self) -> bool {
        let released = self.session.dispose().await;
        if released {
            debug!("Unit of work disposed");
        }
        released
    }

    /// Whether the session has been released.
    pub async fn is_disposed(&self) -> bool {
        self.session.is_closed().await
    }
}
