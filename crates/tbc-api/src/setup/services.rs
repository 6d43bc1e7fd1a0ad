//! Repository, coordinator and application state setup

use crate::auth::{AuthState, JwtService};
use crate::services::media_lifecycle::RecordCoordinator;
use crate::state::{AppState, DbState, MediaLimits, MediaState};
use sqlx::PgPool;
use std::sync::Arc;
use tbc_core::Config;
use tbc_db::{PostgresPodcastRepository, PostgresSermonRepository, UserRepository};
use tbc_storage::AssetStore;

/// Wire repositories and lifecycle coordinators into the application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    store: Arc<dyn AssetStore>,
) -> Arc<AppState> {
    let user_repository = UserRepository::new(pool.clone());
    let allowed = config.allowed_extensions();

    let podcasts = RecordCoordinator::new(
        store.clone(),
        Arc::new(PostgresPodcastRepository::new(pool.clone())),
        allowed.clone(),
    );
    let sermons = RecordCoordinator::new(
        store.clone(),
        Arc::new(PostgresSermonRepository::new(pool.clone())),
        allowed,
    );

    let auth = Arc::new(AuthState {
        jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_minutes()),
        user_repository: user_repository.clone(),
    });

    tracing::info!("Repositories and media coordinators initialized");

    Arc::new(AppState {
        db: DbState {
            pool,
            user_repository,
        },
        media: MediaState {
            store,
            podcasts,
            sermons,
            limits: MediaLimits::from_config(config),
        },
        auth,
    })
}
