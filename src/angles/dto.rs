use serde::Serialize;

use crate::angles::repo_types::MeasurementRecord;

#[derive(Debug, Serialize)]
pub struct SubmitAngleResponse {
    pub message: &'static str,
    pub record: MeasurementRecord,
}
