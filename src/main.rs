//! Song Request Queue - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Initialize logging
//! 3. Open the configured store (PostgreSQL pool + migrations, or in-memory)
//! 4. Build HTTP router with routes and gates
//! 5. Serve until Ctrl+C / SIGTERM, then shut down gracefully

use std::sync::Arc;

use anyhow::Context;
use song_request_queue::{
    AppState, app,
    config::{Config, StoreBackend},
    db, logging,
    store::{DocumentStore, MemoryStore, PgStore},
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    logging::init(config.log_format)?;
    tracing::info!(backend = ?config.store_backend, "Configuration loaded");

    let store = open_store(&config).await?;
    let state = AppState::new(store, config.key_offset()?);
    let app = app(state, &config.allowed_origins());

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when STORE_BACKEND=postgres")?;

            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            let api_keys = config.seed_api_keys();
            if api_keys.is_empty() {
                tracing::warn!("memory store has no API keys, every /api request will be rejected");
            }
            tracing::info!(
                keys = api_keys.len(),
                accepting = config.seed_accepting,
                "Using in-memory store"
            );

            Ok(Arc::new(MemoryStore::seeded(
                api_keys,
                Some(config.seed_accepting),
            )))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
