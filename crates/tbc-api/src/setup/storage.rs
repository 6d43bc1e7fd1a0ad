//! Asset store setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tbc_core::Config;
use tbc_storage::{create_asset_store, AssetStore};

/// Build the asset store handle shared by every request.
pub async fn setup_asset_store(config: &Config) -> Result<Arc<dyn AssetStore>> {
    tracing::info!("Initializing asset store...");
    let store = create_asset_store(&config.asset_store)
        .await
        .context("Failed to initialize asset store")?;

    tracing::info!(
        backend = %store.backend_type(),
        "Asset store initialized successfully"
    );
    Ok(store)
}
