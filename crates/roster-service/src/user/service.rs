//! User registry operations.

use tracing::info;

use roster_core::config::ServiceOperation;
use roster_core::result::{AppResult, Outcome};
use roster_core::traits::Repository;
use roster_core::types::Predicate;
use roster_entity::{StoredEntity, User, UserRequest};

use crate::context::ServiceContext;

const ENTITY: &str = User::KIND;

/// Adds, replaces, removes, and queries users.
#[derive(Debug, Clone)]
pub struct UserService {
    /// Pool and message catalog.
    ctx: ServiceContext,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a user. The country, when given, is looked up by name.
    pub async fn add(&self, user: UserRequest) -> AppResult<UserRequest> {
        let uow = self.ctx.begin(ServiceOperation::Add, ENTITY, &[]).await?;
        let outcome = uow.users().add(user).await;
        let added = self
            .ctx
            .complete(uow, outcome, ServiceOperation::Add, ENTITY, &[])
            .await?;

        info!(name = %added.name, surname = %added.surname, "User added");
        Ok(added)
    }

    /// Replace the first user matching `predicate` with `user`.
    pub async fn update(
        &self,
        user: UserRequest,
        predicate: &Predicate<UserRequest>,
    ) -> AppResult<bool> {
        let params = [("id", user.id.to_string())];
        let uow = self.ctx.begin(ServiceOperation::Update, ENTITY, &params).await?;
        let outcome = uow.users().update(user, predicate).await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::Update, ENTITY, &params)
            .await
    }

    /// Delete every user matching `predicate`.
    pub async fn delete(&self, predicate: &Predicate<UserRequest>) -> AppResult<bool> {
        let uow = self.ctx.begin(ServiceOperation::Delete, ENTITY, &[]).await?;
        let outcome = uow.users().delete(predicate).await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::Delete, ENTITY, &[])
            .await
    }

    /// The first user matching `predicate`.
    pub async fn get_single(&self, predicate: &Predicate<UserRequest>) -> AppResult<UserRequest> {
        let uow = self.ctx.begin(ServiceOperation::GetSingle, ENTITY, &[]).await?;
        let outcome = uow.users().get_by_condition(predicate).await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::GetSingle, ENTITY, &[])
            .await
    }

    /// Every user matching `predicate`.
    pub async fn get_list(
        &self,
        predicate: &Predicate<UserRequest>,
    ) -> AppResult<Vec<UserRequest>> {
        let uow = self.ctx.begin(ServiceOperation::GetList, ENTITY, &[]).await?;
        let outcome = uow.users().list_by_condition(predicate).await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::GetList, ENTITY, &[])
            .await
    }

    /// Remove every user strictly older than `threshold`.
    ///
    /// Finding nobody to remove is not an error; it returns `0` without
    /// committing.
    pub async fn purge_older_than(&self, threshold: i32) -> AppResult<u64> {
        let params = [("threshold", threshold.to_string())];
        let uow = self.ctx.begin(ServiceOperation::Purge, ENTITY, &params).await?;
        let outcome = uow
            .users()
            .remove_all(&Predicate::field("age").gt(threshold))
            .await;

        if let Outcome::Success(0) = outcome {
            uow.dispose().await;
            info!(threshold, "No users to purge");
            return Ok(0);
        }

        let removed = self
            .ctx
            .complete(uow, outcome, ServiceOperation::Purge, ENTITY, &params)
            .await?;
        info!(threshold, removed, "Purged old users");
        Ok(removed)
    }
}
