#[cfg(feature = "store-cloudinary")]
use crate::CloudinaryAssetStore;
#[cfg(feature = "store-local")]
use crate::LocalAssetStore;
use crate::{AssetStore, AssetStoreBackend, AssetStoreError, AssetStoreResult};
use std::sync::Arc;
use tbc_core::AssetStoreConfig;

/// Create the asset store described by configuration.
///
/// Built once at startup; the returned handle is shared by every request.
pub async fn create_asset_store(config: &AssetStoreConfig) -> AssetStoreResult<Arc<dyn AssetStore>> {
    match config.backend {
        #[cfg(feature = "store-cloudinary")]
        AssetStoreBackend::Cloudinary => {
            let required = |value: &Option<String>, name: &str| {
                value
                    .clone()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| AssetStoreError::ConfigError(format!("{} not configured", name)))
            };

            let store = CloudinaryAssetStore::new(
                required(&config.cloud_name, "CLOUD_NAME")?,
                required(&config.api_key, "API_KEY")?,
                required(&config.api_secret, "API_SECRET")?,
                config.api_base_url.clone(),
                config.chunk_size_bytes,
            )?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-cloudinary"))]
        AssetStoreBackend::Cloudinary => Err(AssetStoreError::ConfigError(
            "Cloudinary backend not available (store-cloudinary feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-local")]
        AssetStoreBackend::Local => {
            let store = LocalAssetStore::new(
                config.local_storage_path.clone(),
                config.local_storage_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-local"))]
        AssetStoreBackend::Local => Err(AssetStoreError::ConfigError(
            "Local backend not available (store-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "store-local", feature = "store-cloudinary"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(backend: AssetStoreBackend, path: &str) -> AssetStoreConfig {
        AssetStoreConfig {
            backend,
            cloud_name: Some("demo".to_string()),
            api_key: Some("key".to_string()),
            api_secret: None,
            api_base_url: "https://api.cloudinary.com/v1_1".to_string(),
            chunk_size_bytes: 6_000_000,
            local_storage_path: path.to_string(),
            local_storage_base_url: "http://localhost:3000/media".to_string(),
        }
    }

    #[tokio::test]
    async fn test_local_backend() {
        let dir = tempdir().unwrap();
        let store = create_asset_store(&config(
            AssetStoreBackend::Local,
            dir.path().to_str().unwrap(),
        ))
        .await
        .unwrap();
        assert_eq!(store.backend_type(), AssetStoreBackend::Local);
    }

    #[tokio::test]
    async fn test_cloudinary_missing_secret() {
        let result = create_asset_store(&config(AssetStoreBackend::Cloudinary, "./unused")).await;
        match result {
            Err(AssetStoreError::ConfigError(msg)) => assert!(msg.contains("API_SECRET")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a configuration error"),
        }
    }

    #[tokio::test]
    async fn test_cloudinary_backend() {
        let mut config = config(AssetStoreBackend::Cloudinary, "./unused");
        config.api_secret = Some("secret".to_string());
        let store = create_asset_store(&config).await.unwrap();
        assert_eq!(store.backend_type(), AssetStoreBackend::Cloudinary);
    }
}
