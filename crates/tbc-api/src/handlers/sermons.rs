use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_record_form;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tbc_core::models::{ListQuery, Sermon, SermonFields, SermonPatch, SermonResponse};
use tbc_core::AppError;

#[utoipa::path(
    get,
    path = "/api/v1/sermons",
    tag = "sermons",
    params(ListQuery),
    responses(
        (status = 200, description = "Sermons, newest first", body = Vec<SermonResponse>)
    )
)]
pub async fn list_sermons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = query.resolve();
    let sermons = state
        .media
        .sermons
        .repository()
        .list(limit, offset)
        .await?;

    Ok(Json(
        sermons
            .into_iter()
            .map(SermonResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/sermons/{id}",
    tag = "sermons",
    params(("id" = i64, Path, description = "Sermon ID")),
    responses(
        (status = 200, description = "Sermon found", body = SermonResponse),
        (status = 404, description = "Sermon not found", body = ErrorResponse)
    )
)]
pub async fn get_sermon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let sermon = state
        .media
        .sermons
        .repository()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Sermon {} not found", id)))?;

    Ok(Json(SermonResponse::from(sermon)))
}

/// Multipart fields: `theme`, `minister`, `short_note`, `cover_image`, `audio_file`.
#[utoipa::path(
    post,
    path = "/api/v1/sermons",
    tag = "sermons",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Sermon created", body = SermonResponse),
        (status = 400, description = "Invalid input or unsupported file type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 502, description = "Media host failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = current_user.id, operation = "create_sermon"))]
pub async fn create_sermon(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_record_form::<Sermon>(multipart, &state.media.limits).await?;

    let fields = SermonFields {
        theme: form.required_text("theme")?,
        minister: form.required_text("minister")?,
        short_note: form.text("short_note").unwrap_or_default(),
    };

    let sermon = state
        .media
        .sermons
        .create(current_user.id, fields, form.files)
        .await?;

    Ok((StatusCode::CREATED, Json(SermonResponse::from(sermon))))
}

/// Any subset of the create fields. At least one must be sent.
#[utoipa::path(
    patch,
    path = "/api/v1/sermons/{id}",
    tag = "sermons",
    params(("id" = i64, Path, description = "Sermon ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Sermon updated", body = SermonResponse),
        (status = 400, description = "Nothing to update or invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the sermon", body = ErrorResponse),
        (status = 404, description = "Sermon not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = current_user.id, record.id = id, operation = "update_sermon"))]
pub async fn update_sermon(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_record_form::<Sermon>(multipart, &state.media.limits).await?;

    let patch = SermonPatch {
        theme: form.text("theme"),
        minister: form.text("minister"),
        short_note: form.fields.get("short_note").map(|note| note.trim().to_string()),
    };

    let sermon = state
        .media
        .sermons
        .update(id, current_user.id, patch, form.files)
        .await?;

    Ok(Json(SermonResponse::from(sermon)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sermons/{id}",
    tag = "sermons",
    params(("id" = i64, Path, description = "Sermon ID")),
    responses(
        (status = 204, description = "Sermon and its media deleted"),
        (status = 403, description = "Caller does not own the sermon", body = ErrorResponse),
        (status = 404, description = "Sermon not found", body = ErrorResponse),
        (status = 502, description = "Media host failed, sermon kept", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user.id = current_user.id, record.id = id, operation = "delete_sermon"))]
pub async fn delete_sermon(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.media.sermons.delete(id, current_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
