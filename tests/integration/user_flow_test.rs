//! Integration tests for the user registry.

use roster_core::config::ReferencePolicy;
use roster_core::error::ErrorKind;
use roster_core::types::Predicate;
use roster_entity::{CountryRequest, Gender, UserRequest};

use crate::helpers::{COUNTRIES, TestApp, csv_file};

fn user(name: &str, age: i32, country: Option<&str>) -> UserRequest {
    UserRequest {
        name: name.to_string(),
        surname: "Kovalenko".to_string(),
        age,
        email: format!("{}@example.com", name.to_lowercase()),
        address: "Kyiv".to_string(),
        gender: Gender::Female,
        country: country.map(CountryRequest::named),
        ..Default::default()
    }
}

async fn seeded() -> TestApp {
    let app = TestApp::new().await;
    let file = csv_file(COUNTRIES);
    app.countries.import_from_file(file.path()).await.unwrap();
    app
}

#[tokio::test]
async fn test_users_filtered_through_country() {
    let app = seeded().await;
    app.users.add(user("Olena", 28, Some("Ukraine"))).await.unwrap();
    app.users.add(user("Greta", 41, Some("Germany"))).await.unwrap();
    app.users.add(user("Nomad", 35, None)).await.unwrap();

    let in_europe = app
        .users
        .get_list(&Predicate::field("country.region").eq("Europe"))
        .await
        .unwrap();
    assert_eq!(in_europe.len(), 2);

    let stateless = app
        .users
        .get_list(&Predicate::field("country.name").is_null())
        .await
        .unwrap();
    assert_eq!(stateless.len(), 1);
    assert_eq!(stateless[0].name, "Nomad");

    let greta = app
        .users
        .get_single(&Predicate::field("email").eq("greta@example.com"))
        .await
        .unwrap();
    assert_eq!(greta.country.unwrap().population, 666666);
}

#[tokio::test]
async fn test_update_then_delete() {
    let app = seeded().await;
    let added = app.users.add(user("Olena", 28, Some("Ukraine"))).await.unwrap();
    let by_id = Predicate::field("id").eq(added.id);

    let mut moved = user("Olena", 29, Some("USA"));
    moved.id = added.id;
    assert!(app.users.update(moved, &by_id).await.unwrap());

    let stored = app.users.get_single(&by_id).await.unwrap();
    assert_eq!(stored.age, 29);
    assert_eq!(stored.country.unwrap().name, "USA");

    assert!(app.users.delete(&by_id).await.unwrap());
    let err = app.users.get_single(&by_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Failed to get User by predicate.");
}

#[tokio::test]
async fn test_update_of_missing_user_is_escalated() {
    let app = seeded().await;
    let mut ghost = user("Ghost", 50, None);
    ghost.id = 404;

    let err = app
        .users
        .update(ghost, &Predicate::field("id").eq(404))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Failed to update User with Id 404.");
}

#[tokio::test]
async fn test_required_reference_rejects_unknown_country() {
    let app = TestApp::with_policy(ReferencePolicy::Require).await;

    let err = app
        .users
        .add(user("Olena", 28, Some("Atlantis")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReferenceNotFound);
    assert!(
        app.users
            .get_list(&Predicate::always())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_purge_removes_only_older_users() {
    let app = seeded().await;
    for (name, age) in [("Young", 20), ("Edge", 30), ("Old", 31), ("Elder", 70)] {
        app.users.add(user(name, age, Some("Ukraine"))).await.unwrap();
    }

    let removed = app
        .users
        .purge_older_than(app.config.worker.purge.age_threshold)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let remaining = app.users.get_list(&Predicate::always()).await.unwrap();
    let names: Vec<&str> = remaining.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Young", "Edge"]);

    assert_eq!(app.users.purge_older_than(30).await.unwrap(), 0);
}

#[tokio::test]
async fn test_untranslatable_predicate_is_escalated() {
    let app = seeded().await;

    let err = app
        .users
        .get_list(&Predicate::field("country").is_null())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TranslationUnsupported);
    assert_eq!(err.message, "Failed to get list of Users by condition.");
}
