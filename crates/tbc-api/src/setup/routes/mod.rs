//! Route configuration and setup.

use crate::auth::auth_middleware;
use crate::handlers::{index, podcasts, sermons, users};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tbc_core::{AssetStoreBackend, Config};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.auth.clone(),
        auth_middleware,
    ));

    let mut app = public_routes()
        .merge(protected_routes)
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"));

    if config.asset_store.backend == AssetStoreBackend::Local {
        tracing::info!(
            path = %config.asset_store.local_storage_path,
            "Serving local media under /media"
        );
        app = app.nest_service("/media", ServeDir::new(&config.asset_store.local_storage_path));
    }

    let app = app
        .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::disable()),
        );

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(index::health))
        .route("/api/v1/", get(index::index))
        .route("/api/v1/users/signup", axum::routing::post(users::signup))
        .route("/api/v1/users/login", axum::routing::post(users::login))
        .route("/api/v1/podcasts", get(podcasts::list_podcasts))
        .route("/api/v1/podcasts/{id}", get(podcasts::get_podcast))
        .route("/api/v1/sermons", get(sermons::list_sermons))
        .route("/api/v1/sermons/{id}", get(sermons::get_sermon))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/me", get(users::me))
        .route(
            "/api/v1/podcasts",
            axum::routing::post(podcasts::create_podcast),
        )
        .route(
            "/api/v1/podcasts/{id}",
            axum::routing::put(podcasts::replace_podcast)
                .patch(podcasts::update_podcast)
                .delete(podcasts::delete_podcast),
        )
        .route("/api/v1/sermons", axum::routing::post(sermons::create_sermon))
        .route(
            "/api/v1/sermons/{id}",
            axum::routing::patch(sermons::update_sermon).delete(sermons::delete_sermon),
        )
}
