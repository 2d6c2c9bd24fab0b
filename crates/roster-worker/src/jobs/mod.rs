//! Built-in job handler implementations.

pub mod import;
pub mod purge;

use std::sync::Arc;
use std::time::Duration;

use roster_core::config::{MessageCatalog, WorkerConfig};
use roster_core::error::AppError;
use roster_core::result::AppResult;
use roster_service::{CountryService, UserService};

use crate::descriptor::JobDescriptor;
use crate::scheduler::JobScheduler;

pub use import::ImportCountriesJob;
pub use purge::PurgeUsersJob;

/// Name of the periodic purge job.
pub const PURGE_OLD_USERS: &str = "purge_old_users";

/// Name of the one-shot country import job.
pub const IMPORT_COUNTRIES: &str = "import_countries";

/// Register the enabled built-in jobs.
pub fn register_default_jobs(
    scheduler: &JobScheduler,
    config: &WorkerConfig,
    messages: &MessageCatalog,
    users: UserService,
    countries: CountryService,
) -> AppResult<()> {
    if config.purge.enabled {
        let interval_secs = config.purge.interval_minutes.checked_mul(60).ok_or_else(|| {
            AppError::validation(format!(
                "Purge interval of {} minutes is too large",
                config.purge.interval_minutes
            ))
        })?;
        scheduler.register(
            JobDescriptor::periodic(
                PURGE_OLD_USERS,
                Duration::from_secs(interval_secs),
                messages.job_prefix(PURGE_OLD_USERS),
            ),
            Arc::new(PurgeUsersJob::new(users, config.purge.age_threshold)),
        )?;
    }

    if config.import.enabled {
        scheduler.register(
            JobDescriptor::one_shot(
                IMPORT_COUNTRIES,
                config.import.start_at,
                messages.job_prefix(IMPORT_COUNTRIES),
            ),
            Arc::new(ImportCountriesJob::new(
                countries,
                config.import.file_path.clone().into(),
            )),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use roster_core::error::ErrorKind;
    use roster_database::DatabasePool;
    use roster_database::migration::run_migrations;
    use roster_service::ServiceContext;

    use super::*;
    use crate::descriptor::JobState;
    use crate::runner::TriggerOutcome;

    async fn services() -> (UserService, CountryService) {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        let ctx = ServiceContext::new(db, Arc::new(MessageCatalog::default()));
        (UserService::new(ctx.clone()), CountryService::new(ctx))
    }

    #[tokio::test]
    async fn test_default_jobs_follow_config() {
        let (users, countries) = services().await;
        let scheduler = JobScheduler::new(Duration::from_secs(5));
        let mut config = WorkerConfig::default();
        config.import.enabled = false;

        register_default_jobs(
            &scheduler,
            &config,
            &MessageCatalog::default(),
            users,
            countries,
        )
        .unwrap();

        let statuses = scheduler.statuses();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name, PURGE_OLD_USERS);
        assert!(scheduler.status(IMPORT_COUNTRIES).is_none());
    }

    #[tokio::test]
    async fn test_oversized_purge_interval_is_rejected() {
        let (users, countries) = services().await;
        let scheduler = JobScheduler::new(Duration::from_secs(5));
        let mut config = WorkerConfig::default();
        config.purge.interval_minutes = u64::MAX;

        let err = register_default_jobs(
            &scheduler,
            &config,
            &MessageCatalog::default(),
            users,
            countries,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(scheduler.status(PURGE_OLD_USERS).is_none());
    }

    #[tokio::test]
    async fn test_import_failure_is_prefixed() {
        let (users, countries) = services().await;
        let scheduler = JobScheduler::new(Duration::from_secs(5));
        let mut config = WorkerConfig::default();
        config.import.file_path = "missing/countries.csv".to_string();

        register_default_jobs(
            &scheduler,
            &config,
            &MessageCatalog::default(),
            users,
            countries,
        )
        .unwrap();

        let TriggerOutcome::Started(run) = scheduler.trigger(IMPORT_COUNTRIES).unwrap() else {
            panic!("expected the import to start");
        };
        assert_eq!(run.wait().await, JobState::Failed);

        let status = scheduler.status(IMPORT_COUNTRIES).unwrap();
        assert_eq!(status.state, JobState::Terminal);
        assert_eq!(
            status.last_error.as_deref(),
            Some("Failed to import countries from file: Failed to import Country records.")
        );
    }
}
