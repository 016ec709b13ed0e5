//! /races resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::IntoResponse,
};
use race_core::Race;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<Uuid>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(race): Json<Race>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &headers).await?;
    let id = state.core.create_race(race).await?;
    Ok((StatusCode::CREATED, [(LOCATION, format!("/races/{id}"))]))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Race>>> {
    Ok(Json(state.core.list_races(query.event_id).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Race>> {
    Ok(Json(state.core.get_race(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(race): Json<Race>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.update_race(id, race).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.delete_race(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
