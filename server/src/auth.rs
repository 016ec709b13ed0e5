//! Bearer-token authentication, delegated to the users service.

use crate::{AppState, error::ApiError};
use axum::http::{HeaderMap, header::AUTHORIZATION};
use race_core::{AdapterError, CoreError};

/// Authenticate a mutating request. Returns the token subject for changelog
/// stamping, `"system"` when the users service does not expose one.
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| CoreError::Auth("missing bearer token".into()))?;

    let subject = state.core.users.authorize(token).await.map_err(|err| match err {
        AdapterError::Auth => CoreError::Auth("bearer token rejected".into()),
        other => CoreError::Dependency(other),
    })?;
    Ok(subject.unwrap_or_else(|| "system".to_string()))
}
