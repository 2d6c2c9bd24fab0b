//! Roster Server
//!
//! Main entry point that wires the crates together and runs the background
//! job scheduler until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use roster_core::config::AppConfig;
use roster_core::error::AppError;
use roster_database::DatabasePool;
use roster_service::{CountryService, ServiceContext, UserService};
use roster_worker::JobScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("ROSTER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Loaded configuration (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Roster v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    roster_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Services ─────────────────────────────────────────
    let messages = Arc::new(config.messages.clone());
    let ctx = ServiceContext::new(db.clone(), Arc::clone(&messages));
    let users = UserService::new(ctx.clone());
    let countries = CountryService::new(ctx);

    // ── Step 3: Background jobs ──────────────────────────────────
    let scheduler = if config.worker.enabled {
        let scheduler =
            JobScheduler::new(Duration::from_secs(config.worker.shutdown_grace_seconds));
        roster_worker::jobs::register_default_jobs(
            &scheduler,
            &config.worker,
            &messages,
            users,
            countries,
        )?;
        scheduler.start()?;
        tracing::info!("Job scheduler started");
        Some(scheduler)
    } else {
        tracing::info!("Job scheduler disabled");
        None
    };

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    db.close().await;

    tracing::info!("Roster shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
