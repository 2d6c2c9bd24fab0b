//! Integration tests for the country catalogue import.

use roster_core::error::ErrorKind;
use roster_core::types::Predicate;
use roster_entity::{CountryRequest, Region};
use roster_service::ImportReport;

use crate::helpers::{COUNTRIES, TestApp, csv_file};

#[tokio::test]
async fn test_import_three_countries() {
    let app = TestApp::new().await;
    let file = csv_file(COUNTRIES);

    let report = app.countries.import_from_file(file.path()).await.unwrap();
    assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

    let all = app.countries.get_countries(&Predicate::always()).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Ukraine", "Germany", "USA"]);

    let germany = app.countries.get_country_by_name("Germany").await.unwrap();
    assert_eq!(germany.population, 666666);
    assert_eq!(germany.region, Region::Europe);
}

#[tokio::test]
async fn test_repeated_import_keeps_catalogue() {
    let app = TestApp::new().await;
    let file = csv_file(COUNTRIES);

    app.countries.import_from_file(file.path()).await.unwrap();
    let again = app.countries.import_from_file(file.path()).await.unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, 3);

    let all = app.countries.get_countries(&Predicate::always()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_header_only_import() {
    let app = TestApp::new().await;
    let file = csv_file("Id,Name,Population,Region\n");

    let report = app.countries.import_from_file(file.path()).await.unwrap();
    assert_eq!(report, ImportReport::default());
    assert!(
        app.countries
            .get_countries(&Predicate::always())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_filtering_imported_countries() {
    let app = TestApp::new().await;
    let file = csv_file(COUNTRIES);
    app.countries.import_from_file(file.path()).await.unwrap();

    let european = app
        .countries
        .get_countries(&Predicate::field("region").eq("Europe"))
        .await
        .unwrap();
    assert_eq!(european.len(), 2);

    let large = Predicate::<CountryRequest>::field("population")
        .gt(100000)
        .and(Predicate::field("name").like("u%"));
    let found = app.countries.get_countries(&large).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "USA");
}

#[tokio::test]
async fn test_missing_file_is_escalated() {
    let app = TestApp::new().await;

    let err = app
        .countries
        .import_from_file("does/not/exist.csv")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
    assert_eq!(err.message, "Failed to import Country records.");
    assert!(app.db.health_check().await.unwrap());
}
