//! /races/{race_id}/start-entries resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::IntoResponse,
};
use race_core::StartEntry;
use uuid::Uuid;

pub async fn create(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    headers: HeaderMap,
    Json(entry): Json<StartEntry>,
) -> ApiResult<impl IntoResponse> {
    let user_id = authorize(&state, &headers).await?;
    let id = state.core.create_start_entry(race_id, entry, &user_id).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/races/{race_id}/start-entries/{id}"))],
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StartEntry>>> {
    Ok(Json(state.core.list_start_entries(race_id).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<StartEntry>> {
    Ok(Json(state.core.get_start_entry(race_id, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(entry): Json<StartEntry>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.update_start_entry(race_id, id, entry).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.delete_start_entry(race_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
