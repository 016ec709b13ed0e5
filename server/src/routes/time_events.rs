//! /time-events resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::IntoResponse,
};
use race_core::TimeEvent;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<Uuid>,
    #[serde(rename = "raceId")]
    pub race_id: Option<Uuid>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<TimeEvent>,
) -> ApiResult<impl IntoResponse> {
    let user_id = authorize(&state, &headers).await?;
    let stored = state.core.process_time_event(event, &user_id).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/time-events/{}", stored.id))],
        Json(stored),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TimeEvent>>> {
    Ok(Json(
        state
            .core
            .list_time_events(query.event_id, query.race_id)
            .await?,
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TimeEvent>> {
    Ok(Json(state.core.get_time_event(id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.withdraw_time_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
