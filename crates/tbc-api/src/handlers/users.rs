use crate::auth::password::{hash_password, verify_password};
use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tbc_core::models::{ListQuery, LoginRequest, SignupRequest, TokenResponse, UserResponse};
use tbc_core::AppError;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    tag = "users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid signup data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "signup"))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    if state.db.user_repository.email_exists(&email).await? {
        return Err(AppError::Conflict(format!("User with email {} already exists", email)).into());
    }

    let hashed = hash_password(&request.password)?;
    let user = state
        .db
        .user_repository
        .create(request.username.trim(), &email, &hashed)
        .await?;

    tracing::info!(user.id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let email = request.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Incorrect email or password".to_string());

    let user = state
        .db
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &user.hashed_password)? {
        return Err(invalid().into());
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("Inactive user".to_string()).into());
    }

    let token = state.auth.jwt.issue(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .user_repository
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(ListQuery),
    responses(
        (status = 200, description = "Registered users", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = query.resolve();
    let users = state.db.user_repository.list(limit, offset).await?;

    Ok(Json(
        users
            .into_iter()
            .map(UserResponse::from)
            .collect::<Vec<_>>(),
    ))
}
