use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `goal` is kept raw so a non-number surfaces as our validation error, not a body rejection.
#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    #[serde(default)]
    pub goal: Value,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub goal: f64,
}
