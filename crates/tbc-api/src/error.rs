//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` can be turned into `HttpAppError` with `?` or
//! `.map_err(Into::into)`, which keeps status, body and logging consistent.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::OnceLock;
use tbc_core::{AppError, ErrorMetadata, LogLevel};
use tbc_storage::AssetStoreError;
use utoipa::ToSchema;

use crate::services::media_lifecycle::LifecycleError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse (orphan rule).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<LifecycleError> for HttpAppError {
    fn from(err: LifecycleError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<AssetStoreError> for HttpAppError {
    fn from(err: AssetStoreError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(err.into())
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with `ErrorResponse`.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

static HIDE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

/// Hide error details from response bodies when running in production.
/// Set once while building the app; later calls keep the first value.
pub fn configure_error_details(is_production: bool) {
    if HIDE_ERROR_DETAILS.set(is_production).is_err() {
        tracing::debug!("Error detail mode already configured");
    }
}

fn hide_error_details() -> bool {
    HIDE_ERROR_DETAILS.get().copied().unwrap_or(false)
}

fn error_body(app_error: &AppError, hide_details: bool) -> ErrorResponse {
    let (details, error_type) = if hide_details || app_error.is_sensitive() {
        (None, None)
    } else {
        (
            Some(app_error.detailed_message()),
            Some(app_error.error_type().to_string()),
        )
    };

    ErrorResponse {
        error: app_error.client_message(),
        details,
        error_type,
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_body(app_error, hide_error_details());
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbc_core::MediaKind;
    use tbc_storage::DeleteFailure;

    #[test]
    fn test_from_asset_store_error() {
        let err = AssetStoreError::delete_failed(
            "cover",
            MediaKind::Image,
            "sermon/images/2026",
            DeleteFailure::Error("timeout".to_string()),
        );
        let HttpAppError(app_err) = err.into();
        match app_err {
            AppError::AssetStore(msg) => assert!(msg.contains("sermon/images/2026")),
            other => panic!("Expected AssetStore variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lifecycle_permission_denied() {
        let HttpAppError(app_err) = LifecycleError::PermissionDenied.into();
        assert_eq!(app_err.http_status_code(), 403);
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let body = error_body(&AppError::Internal("secret path".to_string()), false);
        assert!(body.details.is_none());
        assert_eq!(body.error, "Internal server error");

        let body = error_body(&AppError::NotFound("Sermon 1 not found".to_string()), false);
        assert!(body.details.is_some());
        assert_eq!(body.error_type.as_deref(), Some("NotFound"));

        let body = error_body(&AppError::NotFound("Sermon 1 not found".to_string()), true);
        assert!(body.details.is_none());
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response =
            HttpAppError(AppError::Unauthorized("Could not validate credentials".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
    }

    #[test]
    fn test_error_detail_mode_keeps_first_value() {
        configure_error_details(true);
        configure_error_details(false);
        assert!(hide_error_details());
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_body(&AppError::NotFound("missing".to_string()), false);
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert_eq!(json.get("recoverable").and_then(|v| v.as_bool()), Some(false));
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
    }
}
