//! Mapping of core errors onto the HTTP contract: every 4xx/5xx carries a
//! single `{"detail": ...}` body, never a stack trace.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use race_core::CoreError;
use serde_json::json;
use tracing::error;

pub struct ApiError(CoreError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            CoreError::Field(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            CoreError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                errors
                    .errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            CoreError::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            CoreError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            CoreError::NotFound(what) => (StatusCode::NOT_FOUND, format!("unknown {what}")),
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            CoreError::Dependency(err) => {
                error!(%err, "upstream dependency failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            CoreError::Db(err) => {
                error!(%err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
            CoreError::Internal(msg) => {
                error!(%msg, "invariant breakage");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
