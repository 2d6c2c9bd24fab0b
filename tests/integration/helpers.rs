//! Shared test helpers for integration tests.

use std::io::Write;
use std::sync::Arc;

use roster_core::config::{AppConfig, ReferencePolicy};
use roster_database::DatabasePool;
use roster_database::migration::run_migrations;
use roster_service::{CountryService, ServiceContext, UserService};

/// Test application context
pub struct TestApp {
    /// Database pool for direct queries
    pub db: DatabasePool,
    /// Application config
    pub config: AppConfig,
    /// User service wired to the test database
    pub users: UserService,
    /// Country service wired to the test database
    pub countries: CountryService,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory database
    pub async fn new() -> Self {
        Self::with_policy(ReferencePolicy::AllowNull).await
    }

    /// Create a test application with the given reference policy
    pub async fn with_policy(policy: ReferencePolicy) -> Self {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.reference_policy = policy;

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");

        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let ctx = ServiceContext::new(db.clone(), Arc::new(config.messages.clone()));

        Self {
            users: UserService::new(ctx.clone()),
            countries: CountryService::new(ctx),
            db,
            config,
        }
    }
}

/// Write `content` to a temporary CSV file
pub fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Three countries with a header row.
pub const COUNTRIES: &str = "Id,Name,Population,Region\n\
    1,Ukraine,10000,Europe\n\
    2,Germany,666666,Europe\n\
    3,USA,5654654,NorthAmerica\n";
