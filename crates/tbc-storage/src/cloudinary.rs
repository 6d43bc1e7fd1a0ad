//! Cloudinary-compatible media host over its REST upload API.
//!
//! Images go up in a single signed request. Audio and video go through the
//! chunked path: the payload is split into `chunk_size` slices that share an
//! `X-Unique-Upload-Id`, each carrying its own `Content-Range`. The host
//! answers the last slice with the final asset description.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tbc_core::media::namespaced_identifier;
use tbc_core::{AssetStoreBackend, MediaKind};

use crate::traits::{AssetStore, AssetStoreError, AssetStoreResult, DeleteFailure, StoredAsset};

const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct HostError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<HostError>,
}

pub struct CloudinaryAssetStore {
    client: Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    chunk_size: usize,
}

impl std::fmt::Debug for CloudinaryAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryAssetStore")
            .field("base_url", &self.base_url)
            .field("cloud_name", &self.cloud_name)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl CloudinaryAssetStore {
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
        base_url: String,
        chunk_size: usize,
    ) -> AssetStoreResult<Self> {
        if chunk_size == 0 {
            return Err(AssetStoreError::ConfigError(
                "chunk size must be greater than 0".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AssetStoreError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
            chunk_size,
        })
    }

    /// The host files audio under its video resource type.
    fn resource_type(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Image => "image",
            MediaKind::Audio | MediaKind::Video => "video",
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.cloud_name,
            Self::resource_type(kind),
            action
        )
    }

    /// Add timestamp, api key and signature to `params`.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.api_secret);
        params.insert("api_key", self.api_key.clone());
        params.insert("signature", signature);
        params
    }

    fn upload_params(identifier: &str, folder: &str) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("public_id", namespaced_identifier(folder, identifier)),
            ("asset_folder", folder.to_string()),
            ("display_name", identifier.to_string()),
            ("overwrite", "true".to_string()),
        ])
    }

    /// `chunk` is sent as a sized stream body, so slices of the payload go out
    /// without being copied.
    fn form(params: &BTreeMap<&'static str, String>, chunk: Bytes, identifier: &str) -> Form {
        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(*key, value.clone());
        }
        let length = chunk.len() as u64;
        form.part(
            "file",
            Part::stream_with_length(chunk, length).file_name(identifier.to_string()),
        )
    }

    async fn read_upload_response(
        response: reqwest::Response,
        identifier: &str,
        kind: MediaKind,
        folder: &str,
    ) -> AssetStoreResult<UploadResponse> {
        let status = response.status();
        let body: UploadResponse = response.json().await.map_err(|e| {
            AssetStoreError::upload_failed(
                identifier,
                kind,
                folder,
                format!("unreadable response ({}): {}", status, e),
            )
        })?;

        if !status.is_success() {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AssetStoreError::upload_failed(
                identifier,
                kind,
                folder,
                format!("{} - {}", status, message),
            ));
        }

        Ok(body)
    }

    fn finish_upload(
        body: UploadResponse,
        identifier: &str,
        kind: MediaKind,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset> {
        let remote_url = body.secure_url.ok_or_else(|| {
            AssetStoreError::upload_failed(identifier, kind, folder, "response has no secure_url")
        })?;

        tracing::debug!(
            identifier = %identifier,
            host_public_id = body.public_id.as_deref().unwrap_or_default(),
            "Media host accepted upload"
        );

        Ok(StoredAsset {
            remote_url,
            identifier: identifier.to_string(),
        })
    }

    async fn upload_single(
        &self,
        data: Bytes,
        kind: MediaKind,
        identifier: &str,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset> {
        let params = self.signed(Self::upload_params(identifier, folder));
        let response = self
            .client
            .post(self.endpoint(kind, "upload"))
            .multipart(Self::form(&params, data, identifier))
            .send()
            .await
            .map_err(|e| AssetStoreError::upload_failed(identifier, kind, folder, e.to_string()))?;

        let body = Self::read_upload_response(response, identifier, kind, folder).await?;
        Self::finish_upload(body, identifier, kind, folder)
    }

    async fn upload_chunked(
        &self,
        data: Bytes,
        kind: MediaKind,
        identifier: &str,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset> {
        let total = data.len();
        let ranges = chunk_ranges(total, self.chunk_size);
        let upload_id = uuid::Uuid::new_v4().simple().to_string();
        let params = self.signed(Self::upload_params(identifier, folder));

        let mut last = None;
        for (index, (start, end)) in ranges.iter().copied().enumerate() {
            let response = self
                .client
                .post(self.endpoint(kind, "upload"))
                .header("X-Unique-Upload-Id", &upload_id)
                .header("Content-Range", format!("bytes {}-{}/{}", start, end, total))
                .multipart(Self::form(&params, data.slice(start..=end), identifier))
                .send()
                .await
                .map_err(|e| {
                    AssetStoreError::upload_failed(
                        identifier,
                        kind,
                        folder,
                        format!("chunk {}/{}: {}", index + 1, ranges.len(), e),
                    )
                })?;

            last = Some(Self::read_upload_response(response, identifier, kind, folder).await?);
        }

        let body = last.ok_or_else(|| {
            AssetStoreError::upload_failed(identifier, kind, folder, "nothing to upload")
        })?;
        Self::finish_upload(body, identifier, kind, folder)
    }
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(
        &self,
        data: Bytes,
        kind: MediaKind,
        identifier: &str,
        folder: &str,
    ) -> AssetStoreResult<StoredAsset> {
        if data.is_empty() {
            return Err(AssetStoreError::upload_failed(
                identifier,
                kind,
                folder,
                "empty payload",
            ));
        }

        let start = std::time::Instant::now();
        let size_bytes = data.len();

        let result = if kind.is_large() {
            self.upload_chunked(data, kind, identifier, folder).await
        } else {
            self.upload_single(data, kind, identifier, folder).await
        };

        match &result {
            Ok(stored) => tracing::info!(
                identifier = %identifier,
                kind = %kind,
                folder = %folder,
                size_bytes,
                url = %stored.remote_url,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Media host upload successful"
            ),
            Err(e) => tracing::error!(
                error = %e,
                identifier = %identifier,
                kind = %kind,
                folder = %folder,
                size_bytes,
                "Media host upload failed"
            ),
        }

        result
    }

    async fn delete(&self, identifier: &str, kind: MediaKind, folder: &str) -> AssetStoreResult<()> {
        let params = self.signed(BTreeMap::from([(
            "public_id",
            namespaced_identifier(folder, identifier),
        )]));

        let response = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AssetStoreError::delete_failed(
                    identifier,
                    kind,
                    folder,
                    DeleteFailure::Error(e.to_string()),
                )
            })?;

        let status = response.status();
        let body: DestroyResponse = response.json().await.map_err(|e| {
            AssetStoreError::delete_failed(
                identifier,
                kind,
                folder,
                DeleteFailure::Error(format!("unreadable response ({}): {}", status, e)),
            )
        })?;

        let outcome = if status.is_success() {
            destroy_outcome(body.result.as_deref())
        } else {
            Err(DeleteFailure::Error(format!(
                "{} - {}",
                status,
                body.error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string())
            )))
        };

        match outcome {
            Ok(()) => {
                tracing::info!(
                    identifier = %identifier,
                    kind = %kind,
                    folder = %folder,
                    "Media host delete successful"
                );
                Ok(())
            }
            Err(reason) => Err(AssetStoreError::delete_failed(identifier, kind, folder, reason)),
        }
    }

    fn backend_type(&self) -> AssetStoreBackend {
        AssetStoreBackend::Cloudinary
    }
}

/// Hex SHA-256 of `k1=v1&k2=v2...{secret}` with keys in sorted order.
pub(crate) fn sign(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Inclusive byte ranges covering `total` bytes in slices of at most `chunk_size`.
pub(crate) fn chunk_ranges(total: usize, chunk_size: usize) -> Vec<(usize, usize)> {
    (0..total)
        .step_by(chunk_size.max(1))
        .map(|start| (start, (start + chunk_size).min(total) - 1))
        .collect()
}

fn destroy_outcome(result: Option<&str>) -> Result<(), DeleteFailure> {
    match result {
        Some("ok") => Ok(()),
        Some("not found") => Err(DeleteFailure::NotFound),
        Some(other) => Err(DeleteFailure::Error(format!("unexpected result '{}'", other))),
        None => Err(DeleteFailure::Error("response has no result".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_chunk_ranges() {
        assert_eq!(chunk_ranges(10, 4), vec![(0, 3), (4, 7), (8, 9)]);
        assert_eq!(chunk_ranges(8, 4), vec![(0, 3), (4, 7)]);
        assert_eq!(chunk_ranges(3, 6_000_000), vec![(0, 2)]);
        assert!(chunk_ranges(0, 4).is_empty());
    }

    #[test]
    fn test_chunk_ranges_cover_every_byte_once() {
        let total = 13_000_001;
        let ranges = chunk_ranges(total, 6_000_000);
        assert_eq!(ranges.len(), 3);
        let covered: usize = ranges.iter().map(|(s, e)| e - s + 1).sum();
        assert_eq!(covered, total);
        assert!(ranges.iter().all(|(s, e)| e - s < 6_000_000));
    }

    #[test]
    fn test_sign_sorts_params_and_skips_empty() {
        let params = BTreeMap::from([
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
            ("eager", String::new()),
        ]);
        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample_image&timestamp=1315060510abcd");
        assert_eq!(sign(&params, "abcd"), hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_resource_type_for_audio_is_video() {
        assert_eq!(CloudinaryAssetStore::resource_type(MediaKind::Image), "image");
        assert_eq!(CloudinaryAssetStore::resource_type(MediaKind::Audio), "video");
        assert_eq!(CloudinaryAssetStore::resource_type(MediaKind::Video), "video");
    }

    #[test]
    fn test_destroy_outcome() {
        assert_eq!(destroy_outcome(Some("ok")), Ok(()));
        assert_eq!(destroy_outcome(Some("not found")), Err(DeleteFailure::NotFound));
        assert!(matches!(
            destroy_outcome(Some("error")),
            Err(DeleteFailure::Error(_))
        ));
        assert!(matches!(destroy_outcome(None), Err(DeleteFailure::Error(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = CloudinaryAssetStore::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            "http://localhost".to_string(),
            0,
        );
        assert!(matches!(result, Err(AssetStoreError::ConfigError(_))));
    }

    struct SeenUpload {
        resource: String,
        range: Option<String>,
        upload_id: Option<String>,
        content_length: Option<String>,
        file: Vec<u8>,
    }

    #[derive(Default)]
    struct Seen {
        uploads: Vec<SeenUpload>,
        destroys: Vec<String>,
    }

    type Shared = Arc<Mutex<Seen>>;

    async fn mock_upload(
        State(seen): State<Shared>,
        axum::extract::Path((_cloud, resource)): axum::extract::Path<(String, String)>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let mut file = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                file = field.bytes().await.unwrap().to_vec();
            }
        }
        seen.lock().unwrap().uploads.push(SeenUpload {
            resource,
            range: header("content-range"),
            upload_id: header("x-unique-upload-id"),
            content_length: header("content-length"),
            file,
        });
        Json(json!({
            "public_id": "sermon/audios/2026/ep",
            "secure_url": "https://res.example/sermon/audios/2026/ep"
        }))
    }

    async fn mock_destroy(
        State(seen): State<Shared>,
        axum::extract::Path((_cloud, resource)): axum::extract::Path<(String, String)>,
    ) -> (StatusCode, Json<Value>) {
        let mut seen = seen.lock().unwrap();
        seen.destroys.push(resource);
        let result = if seen.destroys.len() == 1 { "ok" } else { "not found" };
        (StatusCode::OK, Json(json!({ "result": result })))
    }

    async fn spawn_mock_host() -> (String, Shared) {
        let seen: Shared = Arc::default();
        let app = Router::new()
            .route("/{cloud}/{resource}/upload", post(mock_upload))
            .route("/{cloud}/{resource}/destroy", post(mock_destroy))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn store(base_url: String, chunk_size: usize) -> CloudinaryAssetStore {
        CloudinaryAssetStore::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            base_url,
            chunk_size,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_audio_upload_is_chunked_under_one_upload_id() {
        let (base_url, seen) = spawn_mock_host().await;
        let store = store(base_url, 4);

        let stored = store
            .upload(
                Bytes::from_static(b"0123456789"),
                MediaKind::Audio,
                "ep",
                "sermon/audios/2026",
            )
            .await
            .unwrap();

        assert_eq!(stored.identifier, "ep");
        assert_eq!(stored.remote_url, "https://res.example/sermon/audios/2026/ep");

        let seen = seen.lock().unwrap();
        let ranges: Vec<_> = seen
            .uploads
            .iter()
            .map(|upload| upload.range.clone().unwrap())
            .collect();
        assert_eq!(ranges, vec!["bytes 0-3/10", "bytes 4-7/10", "bytes 8-9/10"]);
        let files: Vec<&[u8]> = seen.uploads.iter().map(|u| u.file.as_slice()).collect();
        assert_eq!(files, vec![&b"0123"[..], &b"4567"[..], &b"89"[..]]);
        assert!(seen.uploads.iter().all(|u| u.resource == "video"));
        assert!(seen.uploads.iter().all(|u| u.content_length.is_some()));
        let first_id = seen.uploads[0].upload_id.clone();
        assert!(first_id.is_some());
        assert!(seen.uploads.iter().all(|u| u.upload_id == first_id));
    }

    #[tokio::test]
    async fn test_image_upload_is_single_shot() {
        let (base_url, seen) = spawn_mock_host().await;
        let store = store(base_url, 4);

        store
            .upload(
                Bytes::from_static(b"0123456789"),
                MediaKind::Image,
                "cover",
                "sermon/images/2026",
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.uploads.len(), 1);
        assert_eq!(seen.uploads[0].resource, "image");
        assert_eq!(seen.uploads[0].range, None);
        assert_eq!(seen.uploads[0].file, b"0123456789");
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_without_request() {
        let (base_url, seen) = spawn_mock_host().await;
        let store = store(base_url, 4);

        let err = store
            .upload(Bytes::new(), MediaKind::Video, "ep", "podcast/videos/2026")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetStoreError::UploadFailed { .. }));
        assert!(seen.lock().unwrap().uploads.is_empty());
    }

    #[tokio::test]
    async fn test_delete_maps_not_found() {
        let (base_url, seen) = spawn_mock_host().await;
        let store = store(base_url, 4);

        store
            .delete("cover", MediaKind::Image, "sermon/images/2026")
            .await
            .unwrap();
        let err = store
            .delete("cover", MediaKind::Image, "sermon/images/2026")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(seen.lock().unwrap().destroys, vec!["image", "image"]);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upload_failure() {
        let store = store("http://127.0.0.1:9".to_string(), 4);
        let err = store
            .upload(Bytes::from_static(b"x"), MediaKind::Image, "cover", "sermon/images/2026")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetStoreError::UploadFailed { .. }));
    }
}
