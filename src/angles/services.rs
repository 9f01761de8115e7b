use serde_json::Value;
use tracing::info;

use crate::angles::repo_types::MeasurementRecord;
use crate::auth::claims::Identity;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_angles(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<MeasurementRecord>, AppError> {
    state.angles.list_by_owner(&identity.email).await
}

/// Appends `payload` as a record owned by `identity`.
///
/// Any client-sent owner or timestamp is replaced.
pub async fn submit_angle(
    state: &AppState,
    identity: &Identity,
    payload: Value,
) -> Result<MeasurementRecord, AppError> {
    let Value::Object(fields) = payload else {
        return Err(AppError::Validation("measurement must be a JSON object".into()));
    };
    let record = state.angles.append(fields, &identity.email).await?;
    info!(email = %identity.email, "measurement stored");
    Ok(record)
}
