//! Multipart parsing for record create and update requests

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use bytes::BytesMut;
use tbc_core::models::MediaRecord;
use tbc_core::AppError;

use crate::services::media_lifecycle::{AssetFile, AssetFiles};
use crate::state::MediaLimits;

/// Text fields and files from one multipart request.
#[derive(Debug, Default)]
pub struct RecordForm {
    pub fields: HashMap<String, String>,
    pub files: AssetFiles,
}

impl RecordForm {
    /// Non-empty text field, if sent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn required_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::InvalidInput(format!("{} is required", name)))
    }

    pub fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| {
                    AppError::InvalidInput(format!("{} has an invalid value '{}'", name, raw))
                })
            })
            .transpose()
    }

    pub fn required_parsed<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        self.parsed(name)?
            .ok_or_else(|| AppError::InvalidInput(format!("{} is required", name)))
    }
}

/// Read a record form. Parts named after one of `R`'s slots are files and
/// are checked against the size limit for the slot's kind while they stream
/// in. Every other part is a text field. File parts sent without content are
/// ignored.
pub async fn read_record_form<R: MediaRecord>(
    mut multipart: Multipart,
    limits: &MediaLimits,
) -> Result<RecordForm, AppError> {
    let mut form = RecordForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if let Some(slot) = R::slot(&field_name) {
            if form.files.contains_key(slot.name) {
                return Err(AppError::InvalidInput(format!(
                    "Multiple files sent for '{}'",
                    slot.name
                )));
            }
            let filename = field
                .file_name()
                .map(|s: &str| s.to_string())
                .unwrap_or_default();

            let max_size = limits.max_for(slot.kind);
            let mut buffer = BytesMut::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
            {
                validate_file_size(buffer.len() + chunk.len(), max_size)?;
                buffer.extend_from_slice(&chunk);
            }
            let data = buffer.freeze();

            if data.is_empty() && filename.is_empty() {
                continue;
            }
            if data.is_empty() {
                return Err(AppError::InvalidInput(format!("{} is empty", slot.name)));
            }

            form.files
                .insert(slot.name.to_string(), AssetFile { filename, data });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read field: {}", e)))?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}
