//! Media-backed record lifecycle.
//!
//! `RecordCoordinator` sequences asset store calls with database writes so a
//! record's row and its remote assets never disagree:
//!
//! - create: validate, upload, persist
//! - update: check owner, validate, upload, persist, then purge replaced assets
//! - delete: check owner, delete assets, then delete the row
//!
//! Assets uploaded by a request whose persistence step fails are deleted again
//! before the error is returned.
//!
//! Every upload gets its own identifier, the derived filename plus a random
//! suffix, so no two records or versions ever share a remote asset.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, Utc};
use tbc_core::media::{derive_identifier, logical_folder, UnsupportedMediaType};
use tbc_core::models::{MediaRecord, NewRecord, RecordPatch};
use tbc_core::{AllowedExtensions, AppError, AssetSlot, MediaAsset};
use tbc_db::RecordRepository;
use tbc_storage::{AssetStore, AssetStoreError};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub filename: String,
    pub data: Bytes,
}

impl AssetFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Files keyed by slot name (`cover_image`, `audio_file`, `video_file`).
pub type AssetFiles = BTreeMap<String, AssetFile>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{slot}: {source}")]
    UnsupportedMediaType {
        slot: &'static str,
        #[source]
        source: UnsupportedMediaType,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{record_type} {id} not found")]
    RecordNotFound { record_type: &'static str, id: i64 },

    #[error("Permission denied")]
    PermissionDenied,

    #[error(transparent)]
    AssetStore(#[from] AssetStoreError),

    #[error("Failed to persist record: {0}")]
    Persistence(#[source] AppError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::UnsupportedMediaType { slot, source } => {
                AppError::UnsupportedMediaType(format!("{}: {}", slot, source))
            }
            LifecycleError::InvalidInput(msg) => AppError::InvalidInput(msg),
            LifecycleError::RecordNotFound { record_type, id } => {
                AppError::NotFound(format!("{} {} not found", capitalize(record_type), id))
            }
            LifecycleError::PermissionDenied => {
                AppError::Forbidden("Permission denied".to_string())
            }
            LifecycleError::AssetStore(e) => e.into(),
            LifecycleError::Persistence(e) => e,
        }
    }
}

/// `{derived}_{uuid}` for one upload.
fn instance_identifier(derived: &str) -> String {
    format!("{}_{}", derived, Uuid::new_v4().simple())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct PlannedUpload<'a> {
    slot: AssetSlot,
    file: &'a AssetFile,
    derived: String,
}

/// Create, update and delete for one record type.
pub struct RecordCoordinator<R: MediaRecord> {
    store: Arc<dyn AssetStore>,
    repository: Arc<dyn RecordRepository<R>>,
    allowed: AllowedExtensions,
}

impl<R: MediaRecord> Clone for RecordCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            repository: self.repository.clone(),
            allowed: self.allowed.clone(),
        }
    }
}

impl<R: MediaRecord> RecordCoordinator<R> {
    pub fn new(
        store: Arc<dyn AssetStore>,
        repository: Arc<dyn RecordRepository<R>>,
        allowed: AllowedExtensions,
    ) -> Self {
        Self {
            store,
            repository,
            allowed,
        }
    }

    pub fn repository(&self) -> &Arc<dyn RecordRepository<R>> {
        &self.repository
    }

    /// Upload every slot's file and persist a new record owned by `owner_id`.
    #[tracing::instrument(skip(self, fields, files), fields(record.type = R::RECORD_TYPE, user.id = owner_id))]
    pub async fn create(
        &self,
        owner_id: i64,
        fields: R::Fields,
        files: AssetFiles,
    ) -> Result<R, LifecycleError> {
        fields
            .validate()
            .map_err(|e| LifecycleError::InvalidInput(e.to_string()))?;
        let planned = self.check_files(&files, true)?;

        let assets = self.upload_all(planned).await?;

        let new_record = NewRecord::<R> {
            owner_id,
            fields,
            assets: assets.clone(),
        };

        match self.repository.insert(new_record).await {
            Ok(record) => {
                tracing::info!(record.id = record.id(), "Record created");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisting new record failed, discarding uploaded assets");
                self.discard(assets.values()).await;
                Err(LifecycleError::Persistence(e))
            }
        }
    }

    /// Apply `patch` and replace the slots present in `files`.
    ///
    /// Replaced assets are deleted only after the new row is committed. A
    /// failed purge at that point is logged and the update still succeeds.
    #[tracing::instrument(skip(self, patch, files), fields(record.type = R::RECORD_TYPE, record.id = record_id, user.id = caller_id))]
    pub async fn update(
        &self,
        record_id: i64,
        caller_id: i64,
        patch: R::Patch,
        files: AssetFiles,
    ) -> Result<R, LifecycleError> {
        if patch.is_empty() && files.is_empty() {
            return Err(LifecycleError::InvalidInput(
                "At least one field or file must be provided".to_string(),
            ));
        }
        patch
            .validate()
            .map_err(|e| LifecycleError::InvalidInput(e.to_string()))?;

        let existing = self.load_owned(record_id, caller_id).await?;
        let planned = self.check_files(&files, false)?;

        let uploaded = self.upload_all(planned).await?;

        let mut updated = existing;
        updated.apply_patch(patch);

        let mut replaced = Vec::new();
        for (slot, asset) in &uploaded {
            if let Some(current) = updated.asset_mut(slot) {
                replaced.push(std::mem::replace(current, asset.clone()));
            }
        }

        let persisted = match self.repository.update(&updated).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Persisting record update failed, discarding uploaded assets");
                self.discard(uploaded.values()).await;
                return Err(LifecycleError::Persistence(e));
            }
        };

        for old in replaced {
            match self
                .store
                .delete(&old.identifier, old.kind, &old.folder)
                .await
            {
                Ok(()) => {
                    tracing::debug!(public_id = %old.public_id(), "Replaced asset deleted");
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(public_id = %old.public_id(), "Replaced asset was already gone");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        public_id = %old.public_id(),
                        "Failed to delete replaced asset, it is now orphaned"
                    );
                }
            }
        }

        tracing::info!("Record updated");
        Ok(persisted)
    }

    /// Delete the record's assets, then its row.
    ///
    /// The row is kept when any asset delete fails. An asset the host no
    /// longer has counts as deleted.
    #[tracing::instrument(skip(self), fields(record.type = R::RECORD_TYPE, record.id = record_id, user.id = caller_id))]
    pub async fn delete(&self, record_id: i64, caller_id: i64) -> Result<(), LifecycleError> {
        let existing = self.load_owned(record_id, caller_id).await?;

        for (slot, asset) in existing.assets() {
            match self
                .store
                .delete(&asset.identifier, asset.kind, &asset.folder)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(
                        slot = slot.name,
                        public_id = %asset.public_id(),
                        "Asset already missing on the media host"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        slot = slot.name,
                        public_id = %asset.public_id(),
                        "Asset delete failed, keeping record"
                    );
                    return Err(e.into());
                }
            }
        }

        let removed = self
            .repository
            .delete(record_id)
            .await
            .map_err(LifecycleError::Persistence)?;
        if !removed {
            return Err(LifecycleError::RecordNotFound {
                record_type: R::RECORD_TYPE,
                id: record_id,
            });
        }

        tracing::info!("Record deleted");
        Ok(())
    }

    async fn load_owned(&self, record_id: i64, caller_id: i64) -> Result<R, LifecycleError> {
        let record = self
            .repository
            .find_by_id(record_id)
            .await
            .map_err(LifecycleError::Persistence)?
            .ok_or(LifecycleError::RecordNotFound {
                record_type: R::RECORD_TYPE,
                id: record_id,
            })?;

        if record.owner_id() != caller_id {
            tracing::warn!(owner.id = record.owner_id(), "Caller does not own record");
            return Err(LifecycleError::PermissionDenied);
        }

        Ok(record)
    }

    /// Match files to slots, check extensions and derive each file's name.
    /// With `require_all`, every slot of `R` must have a file.
    fn check_files<'a>(
        &self,
        files: &'a AssetFiles,
        require_all: bool,
    ) -> Result<Vec<PlannedUpload<'a>>, LifecycleError> {
        if let Some(unknown) = files.keys().find(|name| R::slot(name).is_none()) {
            return Err(LifecycleError::InvalidInput(format!(
                "Unknown file field '{}'",
                unknown
            )));
        }

        let mut planned = Vec::with_capacity(R::SLOTS.len());
        for slot in R::SLOTS {
            let Some(file) = files.get(slot.name) else {
                if require_all {
                    return Err(LifecycleError::InvalidInput(format!(
                        "{} is required",
                        slot.name
                    )));
                }
                continue;
            };

            self.allowed
                .check(slot.kind, &file.filename)
                .map_err(|source| LifecycleError::UnsupportedMediaType {
                    slot: slot.name,
                    source,
                })?;

            let derived = derive_identifier(&file.filename);
            if derived.is_empty() {
                return Err(LifecycleError::InvalidInput(format!(
                    "{}: filename '{}' has no name before its extension",
                    slot.name, file.filename
                )));
            }
            planned.push(PlannedUpload {
                slot: *slot,
                file,
                derived,
            });
        }

        Ok(planned)
    }

    /// Upload in slot order. On failure, whatever this call already uploaded
    /// is deleted again.
    async fn upload_all(
        &self,
        planned: Vec<PlannedUpload<'_>>,
    ) -> Result<BTreeMap<&'static str, MediaAsset>, LifecycleError> {
        let year = Utc::now().year();
        let mut uploaded: BTreeMap<&'static str, MediaAsset> = BTreeMap::new();

        for PlannedUpload {
            slot,
            file,
            derived,
        } in planned
        {
            let folder = logical_folder(R::RECORD_TYPE, slot.kind, year);
            let identifier = instance_identifier(&derived);

            match self
                .store
                .upload(file.data.clone(), slot.kind, &identifier, &folder)
                .await
            {
                Ok(stored) => {
                    uploaded.insert(
                        slot.name,
                        MediaAsset {
                            identifier: stored.identifier,
                            folder,
                            remote_url: stored.remote_url,
                            kind: slot.kind,
                        },
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, slot = slot.name, "Asset upload failed");
                    self.discard(uploaded.values()).await;
                    return Err(e.into());
                }
            }
        }

        Ok(uploaded)
    }

    /// Compensating delete for assets no row references.
    async fn discard<'a>(&self, assets: impl Iterator<Item = &'a MediaAsset>) {
        for asset in assets {
            if let Err(e) = self
                .store
                .delete(&asset.identifier, asset.kind, &asset.folder)
                .await
            {
                tracing::warn!(
                    error = %e,
                    public_id = %asset.public_id(),
                    "Failed to discard unreferenced asset"
                );
            } else {
                tracing::warn!(public_id = %asset.public_id(), "Discarded unreferenced asset");
            }
        }
    }
}
