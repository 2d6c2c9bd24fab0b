//! One-shot import of the country catalogue.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use roster_service::CountryService;

use crate::executor::{JobExecutionError, JobHandler};

/// Imports countries from a CSV file.
#[derive(Debug)]
pub struct ImportCountriesJob {
    /// Country service
    countries: CountryService,
    /// File to import
    path: PathBuf,
}

impl ImportCountriesJob {
    /// Create a new import job
    pub fn new(countries: CountryService, path: PathBuf) -> Self {
        Self { countries, path }
    }
}

#[async_trait]
impl JobHandler for ImportCountriesJob {
    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!(path = %self.path.display(), "Running country import");

        let report = self.countries.import_from_file(&self.path).await?;

        Ok(Some(serde_json::json!({
            "task": "import_countries",
            "path": self.path.display().to_string(),
            "imported": report.imported,
            "skipped": report.skipped,
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use roster_core::config::MessageCatalog;
    use roster_core::error::ErrorKind;
    use roster_database::DatabasePool;
    use roster_database::migration::run_migrations;
    use roster_service::ServiceContext;

    use super::*;

    async fn countries() -> CountryService {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        CountryService::new(ServiceContext::new(db, Arc::new(MessageCatalog::default())))
    }

    #[tokio::test]
    async fn test_import_reports_counts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Name,Population,Region\nPeru,33000000,SouthAmerica\nPeru,1,Europe\n")
            .unwrap();

        let job = ImportCountriesJob::new(countries().await, file.path().to_path_buf());
        let summary = job.execute().await.unwrap().unwrap();
        assert_eq!(summary["imported"], 1);
        assert_eq!(summary["skipped"], 1);
    }

    #[tokio::test]
    async fn test_invalid_file_is_internal_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Population\n12\n").unwrap();

        let job = ImportCountriesJob::new(countries().await, file.path().to_path_buf());
        match job.execute().await.unwrap_err() {
            JobExecutionError::Internal(err) => assert_eq!(err.kind, ErrorKind::Validation),
            other => panic!("unexpected error: {other}"),
        }
    }
}
