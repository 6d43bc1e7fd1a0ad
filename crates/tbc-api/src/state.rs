//! Application state shared by every handler.

use crate::auth::AuthState;
use crate::services::media_lifecycle::RecordCoordinator;
use sqlx::PgPool;
use std::sync::Arc;
use tbc_core::models::{Podcast, Sermon};
use tbc_core::{Config, MediaKind};
use tbc_db::UserRepository;
use tbc_storage::AssetStore;

/// Database pool and repositories that sit outside the lifecycle coordinators.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub user_repository: UserRepository,
}

/// Per-kind upload size limits.
#[derive(Clone, Debug)]
pub struct MediaLimits {
    pub max_image_size: usize,
    pub max_audio_size: usize,
    pub max_video_size: usize,
}

impl MediaLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_image_size: config.media.max_image_size_bytes,
            max_audio_size: config.media.max_audio_size_bytes,
            max_video_size: config.media.max_video_size_bytes,
        }
    }

    pub fn max_for(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_image_size,
            MediaKind::Audio => self.max_audio_size,
            MediaKind::Video => self.max_video_size,
        }
    }
}

/// Lifecycle coordinators and the shared asset store.
#[derive(Clone)]
pub struct MediaState {
    pub store: Arc<dyn AssetStore>,
    pub podcasts: RecordCoordinator<Podcast>,
    pub sermons: RecordCoordinator<Sermon>,
    pub limits: MediaLimits,
}

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
    pub auth: Arc<AuthState>,
}
