//! OpenAPI documentation.
//! Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tbc_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the `bearer_auth` scheme referenced by protected handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "THE BEAUTIFUL CHURCH API",
        version = "1.0.0",
        description = "Podcasts and sermons with cover images, audio and video hosted on an external media service. All endpoints are versioned under /api/v1/."
    ),
    modifiers(&BearerAuth),
    paths(
        handlers::index::index,
        handlers::index::health,
        // Users
        handlers::users::signup,
        handlers::users::login,
        handlers::users::me,
        handlers::users::list_users,
        // Podcasts
        handlers::podcasts::list_podcasts,
        handlers::podcasts::get_podcast,
        handlers::podcasts::create_podcast,
        handlers::podcasts::replace_podcast,
        handlers::podcasts::update_podcast,
        handlers::podcasts::delete_podcast,
        // Sermons
        handlers::sermons::list_sermons,
        handlers::sermons::get_sermon,
        handlers::sermons::create_sermon,
        handlers::sermons::update_sermon,
        handlers::sermons::delete_sermon,
    ),
    components(
        schemas(
            models::PodcastResponse,
            models::SermonResponse,
            models::UserResponse,
            models::SignupRequest,
            models::LoginRequest,
            models::TokenResponse,
            handlers::index::WelcomeResponse,
            handlers::index::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "index", description = "Welcome message and health check"),
        (name = "users", description = "Registration, login and the current user"),
        (name = "podcasts", description = "Podcasts with a cover image and a video file"),
        (name = "sermons", description = "Sermons with a cover image and an audio file")
    )
)]
pub struct ApiDoc;
