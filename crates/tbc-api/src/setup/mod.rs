//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tbc_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.base.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    build_app(&config, pool).await
}

/// Build state and router on an already migrated pool.
pub async fn build_app(config: &Config, pool: PgPool) -> Result<(Arc<AppState>, axum::Router)> {
    crate::error::configure_error_details(config.is_production());
    let store = storage::setup_asset_store(config).await?;
    let state = services::initialize_services(config, pool, store);
    let router = routes::setup_routes(config, state.clone())?;
    Ok((state, router))
}
