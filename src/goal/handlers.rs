use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    goal::{
        dto::{GoalResponse, SetGoalRequest},
        services,
    },
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new().route("/goal", get(get_goal).put(set_goal).post(set_goal))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<GoalResponse>, AppError> {
    let goal = services::get_goal(&state, &identity).await?;
    Ok(Json(GoalResponse { goal }))
}

#[instrument(skip(state, payload))]
pub async fn set_goal(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<SetGoalRequest>, JsonRejection>,
) -> Result<Json<GoalResponse>, AppError> {
    let Json(payload) = payload?;
    let goal = services::set_goal(&state, &identity, &payload.goal).await?;
    Ok(Json(GoalResponse { goal }))
}
