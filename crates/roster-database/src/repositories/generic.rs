//! Predicate-driven repository shared by every record kind.

use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use roster_core::config::ReferencePolicy;
use roster_core::error::ErrorKind;
use roster_core::result::{Failure, Outcome};
use roster_core::traits::Repository;
use roster_core::types::Predicate;
use roster_entity::{PublicRecord, Reference, StoredEntity};

use super::messages;
use crate::session::{Session, SessionError, StagedMutation};

/// Repository over public records `R`, backed by the session of a unit of
/// work. Mutations are staged on the session; nothing is committed here.
#[derive(Debug)]
pub struct SqlRepository<'s, R> {
    session: &'s Session,
    policy: ReferencePolicy,
    record: PhantomData<fn() -> R>,
}

impl<'s, R: PublicRecord> SqlRepository<'s, R> {
    /// Create a repository on a session.
    pub fn new(session: &'s Session, policy: ReferencePolicy) -> Self {
        Self {
            session,
            policy,
            record: PhantomData,
        }
    }

    fn failure(&self, err: SessionError, message: &'static str) -> Failure {
        match err {
            SessionError::Closed => Failure::new(ErrorKind::SessionClosed, messages::SESSION_CLOSED),
            SessionError::Unsupported(e) => Failure::new(e.kind, e.message),
            SessionError::Storage(e) => {
                error!(entity = R::Entity::KIND, error = %e, "{message}");
                Failure::new(ErrorKind::StorageFault, message)
            }
        }
    }

    async fn load(
        &self,
        predicate: &Predicate<R>,
        message: &'static str,
    ) -> Result<Vec<R::Entity>, Failure> {
        let storage = R::field_map()
            .translate(predicate)
            .map_err(|e| Failure::new(e.kind, e.message))?;
        debug!(entity = R::Entity::KIND, predicate = %storage, "Loading records");
        self.session
            .fetch::<R::Entity>(storage.condition())
            .await
            .map_err(|e| self.failure(e, message))
    }

    async fn load_first(
        &self,
        predicate: &Predicate<R>,
        message: &'static str,
    ) -> Result<R::Entity, Failure> {
        let storage = R::field_map()
            .translate(predicate)
            .map_err(|e| Failure::new(e.kind, e.message))?;
        debug!(entity = R::Entity::KIND, predicate = %storage, "Loading first record");
        self.session
            .fetch_first::<R::Entity>(storage.condition())
            .await
            .map_err(|e| self.failure(e, message))?
            .ok_or_else(|| Failure::new(ErrorKind::NotFound, messages::NOT_FOUND))
    }

    async fn resolve(
        &self,
        reference: &Reference,
        message: &'static str,
    ) -> Result<Option<i64>, Failure> {
        self.session
            .lookup(reference)
            .await
            .map_err(|e| self.failure(e, message))
    }

    fn missing_reference(reference: &Reference) -> Failure {
        Failure::new(
            ErrorKind::ReferenceNotFound,
            format!("{} '{}' does not exist.", reference.kind, reference.key),
        )
    }

    async fn stage(&self, mutation: StagedMutation, message: &'static str) -> Result<(), Failure> {
        self.session
            .stage(mutation)
            .await
            .map_err(|e| self.failure(e, message))
    }

    async fn try_list(&self, predicate: &Predicate<R>) -> Result<Vec<R>, Failure> {
        let entities = self.load(predicate, messages::RETRIEVE_FAILED).await?;
        Ok(entities.into_iter().map(R::from_entity).collect())
    }

    async fn try_get(&self, predicate: &Predicate<R>) -> Result<R, Failure> {
        let entity = self.load_first(predicate, messages::RETRIEVE_FAILED).await?;
        Ok(R::from_entity(entity))
    }

    async fn try_add(&self, record: R) -> Result<R, Failure> {
        let reference_id = match record.reference() {
            None => None,
            Some(reference) => match self.resolve(&reference, messages::ADD_FAILED).await? {
                Some(id) => Some(id),
                None if self.policy == ReferencePolicy::AllowNull => {
                    warn!(
                        entity = R::Entity::KIND,
                        reference = reference.kind,
                        key = %reference.key,
                        "Referenced record not found, storing without reference"
                    );
                    None
                }
                None => return Err(Self::missing_reference(&reference)),
            },
        };

        let entity = record.to_entity(record.id(), reference_id);
        self.stage(
            StagedMutation::Insert {
                table: R::Entity::TABLE,
                values: entity.values(),
            },
            messages::ADD_FAILED,
        )
        .await?;
        Ok(record)
    }

    async fn try_update(&self, record: R, predicate: &Predicate<R>) -> Result<bool, Failure> {
        let existing = self.load_first(predicate, messages::UPDATE_FAILED).await?;

        let reference_id = match record.reference() {
            None => None,
            Some(reference) => Some(
                self.resolve(&reference, messages::UPDATE_FAILED)
                    .await?
                    .ok_or_else(|| Self::missing_reference(&reference))?,
            ),
        };

        let id = existing.id();
        let replacement = record.to_entity(id, reference_id);
        self.stage(
            StagedMutation::Replace {
                table: R::Entity::TABLE,
                id,
                values: replacement.values(),
            },
            messages::UPDATE_FAILED,
        )
        .await?;
        Ok(true)
    }

    async fn stage_delete(&self, predicate: &Predicate<R>) -> Result<u64, Failure> {
        let ids: Vec<i64> = self
            .load(predicate, messages::DELETE_FAILED)
            .await?
            .iter()
            .map(|entity| entity.id())
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let count = ids.len() as u64;
        self.stage(
            StagedMutation::Delete {
                table: R::Entity::TABLE,
                ids,
            },
            messages::DELETE_FAILED,
        )
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl<'s, R: PublicRecord> Repository<R> for SqlRepository<'s, R> {
    async fn list_by_condition(&self, predicate: &Predicate<R>) -> Outcome<Vec<R>> {
        self.try_list(predicate).await.into()
    }

    async fn get_by_condition(&self, predicate: &Predicate<R>) -> Outcome<R> {
        self.try_get(predicate).await.into()
    }

    async fn add(&self, record: R) -> Outcome<R> {
        self.try_add(record).await.into()
    }

    async fn update(&self, record: R, predicate: &Predicate<R>) -> Outcome<bool> {
        self.try_update(record, predicate).await.into()
    }

    async fn delete(&self, predicate: &Predicate<R>) -> Outcome<bool> {
        match self.stage_delete(predicate).await {
            Ok(0) => Outcome::not_found(messages::NOT_FOUND),
            Ok(_) => Outcome::success(true),
            Err(failure) => Outcome::Failure(failure),
        }
    }

    async fn remove_all(&self, predicate: &Predicate<R>) -> Outcome<u64> {
        self.stage_delete(predicate).await.into()
    }
}
