use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tbc_core::{AssetStoreBackend, MediaKind};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::{AssetStore, AssetStoreError, AssetStoreResult, DeleteFailure, StoredAsset};

/// Filesystem-backed asset store, laid out the same way as the remote host:
/// `{base_path}/{folder}/{identifier}`.
#[derive(Clone)]
pub struct LocalAssetStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalAssetStore {
    /// # Arguments
    /// * `base_path` - Root directory for assets (e.g., "/var/lib/tbc/media")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> AssetStoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            AssetStoreError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalAssetStore {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key(identifier: &str, folder: &str) -> String {
        tbc_core::media::namespaced_identifier(folder, identifier)
    }

    /// Map a key to a path under `base_path`, refusing anything that could
    /// climb out of it.
    fn key_to_path(&self, key: &str) -> AssetStoreResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(AssetStoreError::InvalidKey(format!(
                "'{}' is not a valid relative asset key",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(
        &self,
        data: Bytes,
        kind: MediaKind,
        identifier: &str,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset> {
        let key = Self::key(identifier, folder);
        let path = self.key_to_path(&key)?;
        let fail = |e: std::io::Error| {
            AssetStoreError::upload_failed(identifier, kind, folder, format!("{}: {}", path.display(), e))
        };

        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(fail)?;
        }

        let mut file = fs::File::create(&path).await.map_err(fail)?;
        file.write_all(&data).await.map_err(fail)?;
        file.sync_all().await.map_err(fail)?;

        let remote_url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            identifier = %identifier,
            kind = %kind,
            folder = %folder,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local asset upload successful"
        );

        Ok(StoredAsset {
            remote_url,
            identifier: identifier.to_string(),
        })
    }

    async fn delete(&self, identifier: &str, kind: MediaKind, folder: &str) -> AssetStoreResult<()> {
        let key = Self::key(identifier, folder);
        let path = self.key_to_path(&key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    identifier = %identifier,
                    kind = %kind,
                    "Local asset delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                AssetStoreError::delete_failed(identifier, kind, folder, DeleteFailure::NotFound),
            ),
            Err(e) => Err(AssetStoreError::delete_failed(
                identifier,
                kind,
                folder,
                DeleteFailure::Error(format!("{}: {}", path.display(), e)),
            )),
        }
    }

    fn backend_type(&self) -> AssetStoreBackend {
        AssetStoreBackend::Local
    }
}
