use crate::auth::jwt::JwtService;
use crate::auth::models::CurrentUser;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tbc_core::AppError;
use tbc_db::UserRepository;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub user_repository: UserRepository,
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Resolve `Authorization: Bearer <token>` to an active user and attach it
/// to the request as `CurrentUser`.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    else {
        return unauthorized("Missing authorization header");
    };

    let Some(token) = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
    else {
        return unauthorized("Invalid authorization header format");
    };

    let claims = match auth_state.jwt.validate_token(token.trim()) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let user = match auth_state.user_repository.find_by_id(claims.uid).await {
        Ok(Some(user)) if user.email == claims.sub => user,
        Ok(_) => {
            tracing::debug!(user.id = claims.uid, "Token refers to an unknown user");
            return unauthorized("Could not validate credentials");
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    if !user.is_active {
        tracing::warn!(user.id = user.id, "Inactive user attempted to authenticate");
        return unauthorized("Inactive user");
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
    });
    next.run(request).await
}
