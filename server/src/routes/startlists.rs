//! /startlists resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::IntoResponse,
};
use race_core::Startlist;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub event_id: Uuid,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<Uuid>,
}

pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &headers).await?;
    let startlist = state
        .core
        .generate_startlist_for_event(body.event_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/startlists/{}", startlist.id))],
        Json(startlist),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(startlist): Json<Startlist>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &headers).await?;
    let id = state.core.create_startlist(startlist).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/startlists/{id}"))],
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Startlist>>> {
    Ok(Json(state.core.list_startlists(query.event_id).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Startlist>> {
    Ok(Json(state.core.get_startlist(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(startlist): Json<Startlist>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.update_startlist(id, startlist).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.delete_startlist(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
