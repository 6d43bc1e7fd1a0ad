use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{read_record_form, RecordForm};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tbc_core::models::{
    ListQuery, MediaRecord, Podcast, PodcastFields, PodcastPatch, PodcastResponse,
};
use tbc_core::AppError;

fn podcast_fields(form: &RecordForm) -> Result<PodcastFields, AppError> {
    Ok(PodcastFields {
        title: form.required_text("title")?,
        running_episodes: form.required_parsed("running_episodes")?,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/podcasts",
    tag = "podcasts",
    params(ListQuery),
    responses(
        (status = 200, description = "Podcasts, newest first", body = Vec<PodcastResponse>)
    )
)]
pub async fn list_podcasts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = query.resolve();
    let podcasts = state
        .media
        .podcasts
        .repository()
        .list(limit, offset)
        .await?;

    Ok(Json(
        podcasts
            .into_iter()
            .map(PodcastResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/podcasts/{id}",
    tag = "podcasts",
    params(("id" = i64, Path, description = "Podcast ID")),
    responses(
        (status = 200, description = "Podcast found", body = PodcastResponse),
        (status = 404, description = "Podcast not found", body = ErrorResponse)
    )
)]
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let podcast = state
        .media
        .podcasts
        .repository()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Podcast {} not found", id)))?;

    Ok(Json(PodcastResponse::from(podcast)))
}

/// Multipart fields: `title`, `running_episodes`, `cover_image`, `video_file`.
#[utoipa::path(
    post,
    path = "/api/v1/podcasts",
    tag = "podcasts",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Podcast created", body = PodcastResponse),
        (status = 400, description = "Invalid input or unsupported file type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 502, description = "Media host failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = current_user.id, operation = "create_podcast"))]
pub async fn create_podcast(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_record_form::<Podcast>(multipart, &state.media.limits).await?;
    let fields = podcast_fields(&form)?;

    let podcast = state
        .media
        .podcasts
        .create(current_user.id, fields, form.files)
        .await?;

    Ok((StatusCode::CREATED, Json(PodcastResponse::from(podcast))))
}

/// Full replace: every field and both files are required.
#[utoipa::path(
    put,
    path = "/api/v1/podcasts/{id}",
    tag = "podcasts",
    params(("id" = i64, Path, description = "Podcast ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Podcast replaced", body = PodcastResponse),
        (status = 400, description = "Missing or invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the podcast", body = ErrorResponse),
        (status = 404, description = "Podcast not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = current_user.id, record.id = id, operation = "replace_podcast"))]
pub async fn replace_podcast(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_record_form::<Podcast>(multipart, &state.media.limits).await?;
    let fields = podcast_fields(&form)?;

    if let Some(missing) = Podcast::SLOTS
        .iter()
        .find(|slot| !form.files.contains_key(slot.name))
    {
        return Err(AppError::InvalidInput(format!("{} is required", missing.name)).into());
    }

    let podcast = state
        .media
        .podcasts
        .update(id, current_user.id, PodcastPatch::from(fields), form.files)
        .await?;

    Ok(Json(PodcastResponse::from(podcast)))
}

/// Any subset of the create fields. At least one must be sent.
#[utoipa::path(
    patch,
    path = "/api/v1/podcasts/{id}",
    tag = "podcasts",
    params(("id" = i64, Path, description = "Podcast ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Podcast updated", body = PodcastResponse),
        (status = 400, description = "Nothing to update or invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the podcast", body = ErrorResponse),
        (status = 404, description = "Podcast not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = current_user.id, record.id = id, operation = "update_podcast"))]
pub async fn update_podcast(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_record_form::<Podcast>(multipart, &state.media.limits).await?;

    let patch = PodcastPatch {
        title: form.text("title"),
        running_episodes: form.parsed("running_episodes")?,
    };

    let podcast = state
        .media
        .podcasts
        .update(id, current_user.id, patch, form.files)
        .await?;

    Ok(Json(PodcastResponse::from(podcast)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/podcasts/{id}",
    tag = "podcasts",
    params(("id" = i64, Path, description = "Podcast ID")),
    responses(
        (status = 204, description = "Podcast and its media deleted"),
        (status = 403, description = "Caller does not own the podcast", body = ErrorResponse),
        (status = 404, description = "Podcast not found", body = ErrorResponse),
        (status = 502, description = "Media host failed, podcast kept", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user.id = current_user.id, record.id = id, operation = "delete_podcast"))]
pub async fn delete_podcast(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.media.podcasts.delete(id, current_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
