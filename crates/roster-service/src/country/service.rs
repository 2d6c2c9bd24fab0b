//! Country catalogue operations.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use roster_core::config::ServiceOperation;
use roster_core::result::{AppResult, Outcome};
use roster_core::traits::Repository;
use roster_core::types::Predicate;
use roster_entity::{Country, CountryRequest, StoredEntity};

use super::import::{self, ImportReport};
use crate::context::ServiceContext;

const ENTITY: &str = Country::KIND;

/// Queries the country catalogue and imports it from files.
#[derive(Debug, Clone)]
pub struct CountryService {
    /// Pool and message catalog.
    ctx: ServiceContext,
}

impl CountryService {
    /// Creates a new country service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every country matching `predicate`.
    pub async fn get_countries(
        &self,
        predicate: &Predicate<CountryRequest>,
    ) -> AppResult<Vec<CountryRequest>> {
        let uow = self.ctx.begin(ServiceOperation::GetList, ENTITY, &[]).await?;
        let outcome = uow.countries().list_by_condition(predicate).await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::GetList, ENTITY, &[])
            .await
    }

    /// The country called `name`.
    pub async fn get_country_by_name(&self, name: &str) -> AppResult<CountryRequest> {
        let uow = self.ctx.begin(ServiceOperation::GetSingle, ENTITY, &[]).await?;
        let outcome = uow
            .countries()
            .get_by_condition(&Predicate::field("name").eq(name))
            .await;
        self.ctx
            .complete(uow, outcome, ServiceOperation::GetSingle, ENTITY, &[])
            .await
    }

    /// Import countries from a CSV file.
    ///
    /// Rows naming a country that is already stored, or repeating an
    /// earlier row, are skipped. All new rows are committed together.
    pub async fn import_from_file(&self, path: impl AsRef<Path>) -> AppResult<ImportReport> {
        let path = path.as_ref();
        let rows = import::read_rows(path)
            .await
            .map_err(|e| self.ctx.escalate(ServiceOperation::Import, ENTITY, &[], e))?;

        let uow = self.ctx.begin(ServiceOperation::Import, ENTITY, &[]).await?;
        let names: Vec<String> = rows.iter().map(|row| row.name.clone()).collect();
        let existing = match uow
            .countries()
            .list_by_condition(&Predicate::field("name").is_in(names))
            .await
        {
            Outcome::Success(found) => found,
            Outcome::Failure(failure) => {
                let outcome = Outcome::Failure(failure);
                return self
                    .ctx
                    .complete(uow, outcome, ServiceOperation::Import, ENTITY, &[])
                    .await;
            }
        };

        let mut seen: HashSet<String> = existing.into_iter().map(|c| c.name).collect();
        let mut report = ImportReport::default();
        let mut outcome = Outcome::success(());

        for row in rows {
            if row.name.is_empty() || !seen.insert(row.name.clone()) {
                report.skipped += 1;
                continue;
            }
            if let Outcome::Failure(failure) = uow.countries().add(row.into_request()).await {
                outcome = Outcome::Failure(failure);
                break;
            }
            report.imported += 1;
        }

        self.ctx
            .complete(uow, outcome, ServiceOperation::Import, ENTITY, &[])
            .await?;
        info!(
            path = %path.display(),
            imported = report.imported,
            skipped = report.skipped,
            "Countries imported"
        );
        Ok(report)
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
    use roster_entity::Region;

    use super::*;

    async fn service() -> CountryService {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        CountryService::new(ServiceContext::new(db, Arc::new(MessageCatalog::default())))
    }

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const COUNTRIES: &str = "Id,Name,Population,Region\n\
        1,Ukraine,10000,Europe\n\
        2,Germany,666666,Europe\n\
        3,USA,5654654,NorthAmerica\n";

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let svc = service().await;
        let file = csv_file(COUNTRIES);

        let first = svc.import_from_file(file.path()).await.unwrap();
        assert_eq!(first, ImportReport { imported: 3, skipped: 0 });

        let second = svc.import_from_file(file.path()).await.unwrap();
        assert_eq!(second, ImportReport { imported: 0, skipped: 3 });

        let all = svc.get_countries(&Predicate::always()).await.unwrap();
        assert_eq!(all.len(), 3);

        let usa = svc.get_country_by_name("USA").await.unwrap();
        assert_eq!(usa.population, 5654654);
        assert_eq!(usa.region, Region::NorthAmerica);
    }

    #[tokio::test]
    async fn test_repeated_rows_are_skipped() {
        let svc = service().await;
        let file = csv_file("Name,Region\nChile,SouthAmerica\nChile,Europe\nMars,Space\n");

        let report = svc.import_from_file(file.path()).await.unwrap();
        assert_eq!(report, ImportReport { imported: 2, skipped: 1 });

        let chile = svc.get_country_by_name("Chile").await.unwrap();
        assert_eq!(chile.region, Region::SouthAmerica);
        let mars = svc.get_country_by_name("Mars").await.unwrap();
        assert_eq!(mars.region, Region::Unknown);
    }

    #[tokio::test]
    async fn test_header_only_file_imports_nothing() {
        let svc = service().await;
        let file = csv_file("Id,Name,Population,Region\n");

        let report = svc.import_from_file(file.path()).await.unwrap();
        assert_eq!(report, ImportReport::default());
        assert!(svc.get_countries(&Predicate::always()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_file_escalates_and_stores_nothing() {
        let svc = service().await;
        let file = csv_file("Name,Population\nPeru,33000000\nBolivia,lots\n");

        let err = svc.import_from_file(file.path()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Failed to import Country records.");
        assert!(svc.get_countries(&Predicate::always()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_country_escalates() {
        let svc = service().await;
        let err = svc.get_country_by_name("Atlantis").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Failed to get Country by predicate.");
    }
}
