//! /raceplans resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::IntoResponse,
};
use race_core::Raceplan;
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
    let plan = state.core.generate_raceplan_for_event(body.event_id).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/raceplans/{}", plan.id))],
        Json(plan),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(plan): Json<Raceplan>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &headers).await?;
    let id = state.core.create_raceplan(plan).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/raceplans/{id}"))],
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Raceplan>>> {
    Ok(Json(state.core.list_raceplans(query.event_id).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Raceplan>> {
    Ok(Json(state.core.get_raceplan(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(plan): Json<Raceplan>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.update_raceplan(id, plan).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.delete_raceplan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
