//! /races/{race_id}/race-results resource.

use crate::{AppState, auth::authorize, error::ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use race_core::RaceResult;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "timingPoint")]
    pub timing_point: Option<String>,
    #[serde(rename = "idsOnly", default)]
    pub ids_only: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Response> {
    let results = state
        .core
        .list_race_results(race_id, query.timing_point.as_deref())
        .await?;
    if query.ids_only {
        let ids: Vec<Uuid> = results.iter().map(|result| result.id).collect();
        Ok(Json(ids).into_response())
    } else {
        Ok(Json(results).into_response())
    }
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RaceResult>> {
    Ok(Json(state.core.get_race_result(race_id, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(result): Json<RaceResult>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.update_race_result(race_id, id, result).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path((race_id, id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers).await?;
    state.core.delete_race_result(race_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
