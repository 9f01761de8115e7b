use std::sync::Arc;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use crate::angles::repo_types::MeasurementRecord;
use crate::db::RecordStore;
use crate::error::AppError;

/// Measurement Store over a single ordered container for all users.
#[derive(Clone)]
pub struct MeasurementStore {
    store: Arc<dyn RecordStore<MeasurementRecord>>,
    write_lock: Arc<Mutex<()>>,
}

impl MeasurementStore {
    pub fn new(store: Arc<dyn RecordStore<MeasurementRecord>>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Records owned by `email`, oldest first.
    pub async fn list_by_owner(&self, email: &str) -> Result<Vec<MeasurementRecord>, AppError> {
        let rows = self.store.load().await?;
        Ok(rows.into_iter().filter(|r| r.owner_email == email).collect())
    }

    /// Stamps owner and time onto `fields` and appends the record.
    pub async fn append(
        &self,
        fields: Map<String, Value>,
        owner_email: &str,
    ) -> Result<MeasurementRecord, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.store.load().await?;
        let record = MeasurementRecord::stamped(fields, owner_email, OffsetDateTime::now_utc());
        rows.push(record.clone());
        self.store.save(&rows).await?;
        debug!(owner = %owner_email, total = rows.len(), "measurement appended");
        Ok(record)
    }
}
