use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shelf_core::service::ItemService;
use shelf_core::store::{ItemStore, MemoryItemStore};
use shelf_db::{DbPool, PgItemStore};

use shelf_api::config::{ConfigError, ServerConfig, StoreBackend};
use shelf_api::router::build_app_router;
use shelf_api::state::AppState;
use shelf_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    telemetry::init_tracing(config.log_format);
    tracing::info!(
        addr = %config.bind_addr(),
        store = %config.store_backend,
        "Loaded server configuration",
    );

    // --- Store ---
    let (store, pool) = build_store(&config).await?;

    // --- App state & router ---
    let state = AppState::new(ItemService::new(store), config.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = config.bind_addr();
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(pool) = pool {
        let grace = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(grace, pool.close()).await.is_err() {
            tracing::warn!(?grace, "Database pool did not close in time");
        } else {
            tracing::info!("Database pool closed");
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Build the configured item store. The pool is returned for shutdown.
async fn build_store(
    config: &ServerConfig,
) -> anyhow::Result<(Arc<dyn ItemStore>, Option<DbPool>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::MissingDatabaseUrl)?;

            let pool = shelf_db::create_pool(database_url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            shelf_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            shelf_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            let store: Arc<dyn ItemStore> = Arc::new(PgItemStore::new(pool.clone()));
            Ok((store, Some(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory item store; data is lost on shutdown");
            let store: Arc<dyn ItemStore> = Arc::new(MemoryItemStore::new());
            Ok((store, None))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
