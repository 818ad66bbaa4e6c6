//! payroll_ledger - Payroll bookkeeping daemon
//!
//! Hosts the state coordinator over a file-backed store and keeps employee
//! worked days current until interrupted.

use std::sync::Arc;

use payroll_ledger::{Config, Coordinator, FileStore, Repository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Production emits JSON lines.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "payroll_ledger=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(config.is_production());

    tracing::info!(
        data_dir = %config.data_dir.display(),
        environment = %config.environment,
        "Starting payroll_ledger"
    );

    let repository = Repository::new(Arc::new(FileStore::new(&config.data_dir)));
    let coordinator = Coordinator::open(repository);
    coordinator.start_worked_days(config.worked_days_job())?;

    tracing::info!(section = %coordinator.active_section(), "Ready");

    shutdown_signal().await;

    coordinator.shutdown();
    tracing::info!("Goodbye!");

    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
