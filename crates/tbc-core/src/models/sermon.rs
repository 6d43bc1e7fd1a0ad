use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{MediaRecord, RecordPatch};
use crate::media::{AssetSlot, MediaAsset, AUDIO_FILE, COVER_IMAGE};

/// Sermon with a cover image and an audio recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sermon {
    pub id: i64,
    pub user_id: i64,
    pub theme: String,
    pub minister: String,
    pub short_note: String,
    pub cover_image: MediaAsset,
    pub audio_file: MediaAsset,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SermonFields {
    #[validate(length(min = 1, max = 250, message = "Theme must be between 1 and 250 characters"))]
    pub theme: String,
    #[validate(length(min = 1, max = 70, message = "Minister must be between 1 and 70 characters"))]
    pub minister: String,
    #[validate(length(max = 300, message = "Short note must be at most 300 characters"))]
    pub short_note: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct SermonPatch {
    #[serde(default)]
    #[validate(length(min = 1, max = 250, message = "Theme must be between 1 and 250 characters"))]
    pub theme: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 70, message = "Minister must be between 1 and 70 characters"))]
    pub minister: Option<String>,
    #[serde(default)]
    #[validate(length(max = 300, message = "Short note must be at most 300 characters"))]
    pub short_note: Option<String>,
}

impl RecordPatch for SermonPatch {
    fn is_empty(&self) -> bool {
        self.theme.is_none() && self.minister.is_none() && self.short_note.is_none()
    }
}

impl From<SermonFields> for SermonPatch {
    fn from(fields: SermonFields) -> Self {
        SermonPatch {
            theme: Some(fields.theme),
            minister: Some(fields.minister),
            short_note: Some(fields.short_note),
        }
    }
}

impl MediaRecord for Sermon {
    const RECORD_TYPE: &'static str = "sermon";
    const SLOTS: &'static [AssetSlot] = &[COVER_IMAGE, AUDIO_FILE];

    type Fields = SermonFields;
    type Patch = SermonPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.user_id
    }

    fn asset(&self, slot: &str) -> Option<&MediaAsset> {
        match slot {
            s if s == COVER_IMAGE.name => Some(&self.cover_image),
            s if s == AUDIO_FILE.name => Some(&self.audio_file),
            _ => None,
        }
    }

    fn asset_mut(&mut self, slot: &str) -> Option<&mut MediaAsset> {
        match slot {
            s if s == COVER_IMAGE.name => Some(&mut self.cover_image),
            s if s == AUDIO_FILE.name => Some(&mut self.audio_file),
            _ => None,
        }
    }

    fn apply_patch(&mut self, patch: SermonPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(minister) = patch.minister {
            self.minister = minister;
        }
        if let Some(short_note) = patch.short_note {
            self.short_note = short_note;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SermonResponse {
    pub id: i64,
    pub theme: String,
    pub minister: String,
    pub short_note: String,
    pub cover_image: String,
    pub cover_image_public_id: String,
    pub audio_file: String,
    pub audio_public_id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Sermon> for SermonResponse {
    fn from(sermon: Sermon) -> Self {
        SermonResponse {
            id: sermon.id,
            cover_image_public_id: sermon.cover_image.public_id(),
            audio_public_id: sermon.audio_file.public_id(),
            theme: sermon.theme,
            minister: sermon.minister,
            short_note: sermon.short_note,
            cover_image: sermon.cover_image.remote_url,
            audio_file: sermon.audio_file.remote_url,
            user_id: sermon.user_id,
            created_at: sermon.created_at,
            updated_at: sermon.updated_at,
        }
    }
}
