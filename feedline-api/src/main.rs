//! # Feedline API Server
//!
//! Micro-blogging backend: sign-up, login, tweets, follows and timelines
//! over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p feedline-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps everything in memory.

use anyhow::Context;
use feedline_api::{
    app::{build_router, AppState},
    config::Config,
};
use feedline_shared::db::{
    memory::MemoryStorage,
    migrations::run_migrations,
    pool::{close_pool, create_pool},
    postgres::PgStorage,
    storage::Storage,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "feedline_api=debug,feedline_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Feedline API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    let (storage, pool) = connect_storage(&config).await?;
    tracing::info!(storage = storage.name(), "Storage ready");

    let bind_address = config.bind_address();
    let state = AppState::new(storage, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Picks the storage backend from configuration
///
/// Also returns the pool, if any, so it can be closed on shutdown.
async fn connect_storage(config: &Config) -> anyhow::Result<(Arc<dyn Storage>, Option<PgPool>)> {
    let Some(database) = &config.database else {
        tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on exit");
        return Ok((Arc::new(MemoryStorage::new()), None));
    };

    let pool = create_pool(database.clone())
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok((Arc::new(PgStorage::new(pool.clone())), Some(pool)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
