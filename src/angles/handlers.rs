use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;

use crate::{
    angles::{dto::SubmitAngleResponse, repo_types::MeasurementRecord, services},
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
};

pub fn angle_routes() -> Router<AppState> {
    Router::new().route("/angles", get(list_angles).post(submit_angle))
}

#[instrument(skip(state))]
pub async fn list_angles(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<MeasurementRecord>>, AppError> {
    Ok(Json(services::list_angles(&state, &identity).await?))
}

#[instrument(skip(state, payload))]
pub async fn submit_angle(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitAngleResponse>), AppError> {
    let Json(payload) = payload?;
    let record = services::submit_angle(&state, &identity, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitAngleResponse {
            message: "Data saved successfully.",
            record,
        }),
    ))
}
