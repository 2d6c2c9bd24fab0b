//! Integration tests for the built-in jobs running under the scheduler.

use std::time::Duration;

use roster_core::types::Predicate;
use roster_entity::UserRequest;
use roster_worker::jobs::{IMPORT_COUNTRIES, PURGE_OLD_USERS, register_default_jobs};
use roster_worker::{JobScheduler, JobState, JobStatus, TriggerOutcome};

use crate::helpers::{COUNTRIES, TestApp, csv_file};

/// Poll until `name` has finished at least `runs` runs.
async fn wait_for_runs(scheduler: &JobScheduler, name: &str, runs: u64) -> JobStatus {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Some(status) = scheduler.status(name) {
                if status.runs >= runs && status.state != JobState::Running {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}

#[tokio::test]
async fn test_purge_job_runs_on_start() {
    let mut app = TestApp::new().await;
    for (name, age) in [("Taras", 25), ("Mykola", 45), ("Ivan", 60)] {
        app.users
            .add(UserRequest {
                name: name.to_string(),
                age,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    app.config.worker.import.enabled = false;
    let scheduler = JobScheduler::new(Duration::from_secs(5));
    register_default_jobs(
        &scheduler,
        &app.config.worker,
        &app.config.messages,
        app.users.clone(),
        app.countries.clone(),
    )
    .unwrap();
    scheduler.start().unwrap();

    let status = wait_for_runs(&scheduler, PURGE_OLD_USERS, 1).await;
    assert_eq!(status.last_outcome, Some(JobState::Succeeded));
    assert_eq!(status.state, JobState::Scheduled);
    let summary = status.last_result.unwrap();
    assert_eq!(summary["removed"], 2);
    assert_eq!(summary["threshold"], 30);

    let remaining = app.users.get_list(&Predicate::always()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Taras");

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_import_job_runs_once() {
    let mut app = TestApp::new().await;
    let file = csv_file(COUNTRIES);

    app.config.worker.purge.enabled = false;
    app.config.worker.import.file_path = file.path().to_string_lossy().into_owned();
    let scheduler = JobScheduler::new(Duration::from_secs(5));
    register_default_jobs(
        &scheduler,
        &app.config.worker,
        &app.config.messages,
        app.users.clone(),
        app.countries.clone(),
    )
    .unwrap();
    scheduler.start().unwrap();

    let status = wait_for_runs(&scheduler, IMPORT_COUNTRIES, 1).await;
    assert_eq!(status.state, JobState::Terminal);
    assert_eq!(status.last_outcome, Some(JobState::Succeeded));
    assert_eq!(status.last_result.unwrap()["imported"], 3);

    assert!(matches!(
        scheduler.trigger(IMPORT_COUNTRIES).unwrap(),
        TriggerOutcome::Terminal
    ));

    let countries = app
        .countries
        .get_countries(&Predicate::always())
        .await
        .unwrap();
    assert_eq!(countries.len(), 3);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_failing_job_leaves_scheduler_running() {
    let mut app = TestApp::new().await;

    app.config.worker.import.file_path = "missing/countries.csv".to_string();
    let scheduler = JobScheduler::new(Duration::from_secs(5));
    register_default_jobs(
        &scheduler,
        &app.config.worker,
        &app.config.messages,
        app.users.clone(),
        app.countries.clone(),
    )
    .unwrap();
    scheduler.start().unwrap();

    let failed = wait_for_runs(&scheduler, IMPORT_COUNTRIES, 1).await;
    assert_eq!(failed.last_outcome, Some(JobState::Failed));
    assert!(
        failed
            .last_error
            .unwrap()
            .starts_with("Failed to import countries from file:")
    );

    wait_for_runs(&scheduler, PURGE_OLD_USERS, 1).await;
    let TriggerOutcome::Started(run) = scheduler.trigger(PURGE_OLD_USERS).unwrap() else {
        panic!("expected the purge to start");
    };
    assert_eq!(run.wait().await, JobState::Succeeded);

    scheduler.shutdown().await;
}
