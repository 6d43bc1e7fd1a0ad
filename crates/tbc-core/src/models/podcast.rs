use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{MediaRecord, RecordPatch};
use crate::media::{AssetSlot, MediaAsset, COVER_IMAGE, VIDEO_FILE};

/// Podcast with a cover image and a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Podcast {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub running_episodes: i32,
    pub cover_image: MediaAsset,
    pub video_file: MediaAsset,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PodcastFields {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be between 1 and 100 characters"
    ))]
    pub title: String,
    #[validate(range(min = 1, message = "running_episodes must be at least 1"))]
    pub running_episodes: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct PodcastPatch {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be between 1 and 100 characters"
    ))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "running_episodes must be at least 1"))]
    pub running_episodes: Option<i32>,
}

impl RecordPatch for PodcastPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.running_episodes.is_none()
    }
}

/// A full replace is a patch with every field set.
impl From<PodcastFields> for PodcastPatch {
    fn from(fields: PodcastFields) -> Self {
        PodcastPatch {
            title: Some(fields.title),
            running_episodes: Some(fields.running_episodes),
        }
    }
}

impl MediaRecord for Podcast {
    const RECORD_TYPE: &'static str = "podcast";
    const SLOTS: &'static [AssetSlot] = &[COVER_IMAGE, VIDEO_FILE];

    type Fields = PodcastFields;
    type Patch = PodcastPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.user_id
    }

    fn asset(&self, slot: &str) -> Option<&MediaAsset> {
        match slot {
            s if s == COVER_IMAGE.name => Some(&self.cover_image),
            s if s == VIDEO_FILE.name => Some(&self.video_file),
            _ => None,
        }
    }

    fn asset_mut(&mut self, slot: &str) -> Option<&mut MediaAsset> {
        match slot {
            s if s == COVER_IMAGE.name => Some(&mut self.cover_image),
            s if s == VIDEO_FILE.name => Some(&mut self.video_file),
            _ => None,
        }
    }

    fn apply_patch(&mut self, patch: PodcastPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(running_episodes) = patch.running_episodes {
            self.running_episodes = running_episodes;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PodcastResponse {
    pub id: i64,
    pub title: String,
    pub running_episodes: i32,
    pub cover_image: String,
    pub cover_image_public_id: String,
    pub video_file: String,
    pub video_public_id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Podcast> for PodcastResponse {
    fn from(podcast: Podcast) -> Self {
        PodcastResponse {
            id: podcast.id,
            cover_image_public_id: podcast.cover_image.public_id(),
            video_public_id: podcast.video_file.public_id(),
            title: podcast.title,
            running_episodes: podcast.running_episodes,
            cover_image: podcast.cover_image.remote_url,
            video_file: podcast.video_file.remote_url,
            user_id: podcast.user_id,
            created_at: podcast.created_at,
            updated_at: podcast.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    fn podcast() -> Podcast {
        Podcast {
            id: 7,
            user_id: 1,
            title: "Morning Word".to_string(),
            running_episodes: 3,
            cover_image: MediaAsset::from_public_id(
                "podcast/images/2026/cover",
                "https://cdn/cover".to_string(),
                MediaKind::Image,
            ),
            video_file: MediaAsset::from_public_id(
                "podcast/videos/2026/ep1",
                "https://cdn/ep1".to_string(),
                MediaKind::Video,
            ),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_emptiness() {
        assert!(PodcastPatch::default().is_empty());
        let patch = PodcastPatch {
            running_episodes: Some(4),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut record = podcast();
        record.apply_patch(PodcastPatch {
            title: None,
            running_episodes: Some(9),
        });
        assert_eq!(record.title, "Morning Word");
        assert_eq!(record.running_episodes, 9);
    }

    #[test]
    fn test_patch_validation() {
        let patch = PodcastPatch {
            title: Some(String::new()),
            running_episodes: Some(0),
        };
        let errors = patch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("running_episodes"));

        let fields = PodcastFields {
            title: "t".repeat(101),
            running_episodes: 1,
        };
        assert!(fields.validate().is_err());
    }

    #[test]
    fn test_slots() {
        let record = podcast();
        assert_eq!(Podcast::slot("video_file"), Some(VIDEO_FILE));
        assert_eq!(Podcast::slot("audio_file"), None);
        let assets = record.assets();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].0, COVER_IMAGE);
        assert_eq!(assets[1].1.identifier, "ep1");
    }

    #[test]
    fn test_response_flattens_assets() {
        let response = PodcastResponse::from(podcast());
        assert_eq!(response.cover_image, "https://cdn/cover");
        assert_eq!(response.video_public_id, "podcast/videos/2026/ep1");
    }
}
