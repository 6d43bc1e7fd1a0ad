//! Asset store abstraction
//!
//! `AssetStore` is the capability the record coordinator uses to talk to the
//! media host. Implementations hold configuration only, so one instance is
//! shared by every request.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use bytes::Bytes;
use tbc_core::{AppError, AssetStoreBackend, MediaKind};
use thiserror::Error;

/// Why a delete did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFailure {
    /// The host has no asset under that identifier. Usually benign.
    NotFound,
    /// Transport failure or an unexpected answer from the host.
    Error(String),
}

impl Display for DeleteFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DeleteFailure::NotFound => write!(f, "not found"),
            DeleteFailure::Error(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("Upload of {kind} '{identifier}' to '{folder}' failed: {message}")]
    UploadFailed {
        identifier: String,
        kind: MediaKind,
        folder: String,
        message: String,
    },

    #[error("Delete of {kind} '{identifier}' in '{folder}' failed: {reason}")]
    DeleteFailed {
        identifier: String,
        kind: MediaKind,
        folder: String,
        reason: DeleteFailure,
    },

    #[error("Invalid asset key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AssetStoreError {
    pub fn upload_failed(
        identifier: &str,
        kind: MediaKind,
        folder: &str,
        message: impl Into<String>,
    ) -> Self {
        AssetStoreError::UploadFailed {
            identifier: identifier.to_string(),
            kind,
            folder: folder.to_string(),
            message: message.into(),
        }
    }

    pub fn delete_failed(
        identifier: &str,
        kind: MediaKind,
        folder: &str,
        reason: DeleteFailure,
    ) -> Self {
        AssetStoreError::DeleteFailed {
            identifier: identifier.to_string(),
            kind,
            folder: folder.to_string(),
            reason,
        }
    }

    /// A delete that failed only because the asset is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssetStoreError::DeleteFailed {
                reason: DeleteFailure::NotFound,
                ..
            }
        )
    }
}

impl From<AssetStoreError> for AppError {
    fn from(err: AssetStoreError) -> Self {
        match err {
            AssetStoreError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::AssetStore(other.to_string()),
        }
    }
}

/// Result type for asset store operations
pub type AssetStoreResult<T> = Result<T, AssetStoreError>;

/// What the host hands back for a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub remote_url: String,
    pub identifier: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `data` under `{folder}/{identifier}`, replacing any asset
    /// already there. Images go up in one request; audio and video may be
    /// split into chunks, but callers always see a single result.
    async fn upload(
        &self,
        data: Bytes,
        kind: MediaKind,
        identifier: &str,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset>;

    /// Remove `{folder}/{identifier}`. A missing asset is reported as
    /// `DeleteFailed` with `DeleteFailure::NotFound`.
    async fn delete(&self, identifier: &str, kind: MediaKind, folder: &str)
        -> AssetStoreResult<()>;

    fn backend_type(&self) -> AssetStoreBackend;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbc_core::ErrorMetadata;

    #[test]
    fn test_not_found_is_distinct_from_error() {
        let gone = AssetStoreError::delete_failed(
            "cover",
            MediaKind::Image,
            "sermon/images/2026",
            DeleteFailure::NotFound,
        );
        let broken = AssetStoreError::delete_failed(
            "cover",
            MediaKind::Image,
            "sermon/images/2026",
            DeleteFailure::Error("503 Service Unavailable".to_string()),
        );
        assert!(gone.is_not_found());
        assert!(!broken.is_not_found());
        assert!(gone.to_string().contains("not found"));
        assert!(broken.to_string().contains("503"));
    }

    #[test]
    fn test_error_carries_context() {
        let err = AssetStoreError::upload_failed(
            "sermon",
            MediaKind::Audio,
            "sermon/audios/2026",
            "timeout",
        );
        let message = err.to_string();
        assert!(message.contains("audio"));
        assert!(message.contains("'sermon'"));
        assert!(message.contains("sermon/audios/2026"));
    }

    #[test]
    fn test_conversion_to_app_error() {
        let err: AppError =
            AssetStoreError::upload_failed("a", MediaKind::Video, "podcast/videos/2026", "boom")
                .into();
        assert_eq!(err.http_status_code(), 502);

        let err: AppError = AssetStoreError::ConfigError("missing CLOUD_NAME".to_string()).into();
        assert_eq!(err.http_status_code(), 500);
    }
}
