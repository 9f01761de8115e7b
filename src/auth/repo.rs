use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::repo_types::UserRecord;
use crate::db::RecordStore;
use crate::error::AppError;

/// Credential Store: the users container plus the lock that serialises its writers.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn RecordStore<UserRecord>>,
    write_lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn RecordStore<UserRecord>>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.store.load().await?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    /// Appends `record`. Uniqueness is re-checked under the write lock, so two
    /// racing signups for one email cannot both land.
    pub async fn create(&self, record: UserRecord) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;
        if users.iter().any(|u| u.email == record.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        debug!(email = %record.email, "user appended");
        users.push(record);
        self.store.save(&users).await?;
        Ok(())
    }

    pub async fn update_goal(&self, email: &str, goal: f64) -> Result<UserRecord, AppError> {
        if !goal.is_finite() {
            return Err(AppError::Validation("goal must be a number".into()));
        }
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;
        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.goal = Some(goal);
        let updated = user.clone();
        self.store.save(&users).await?;
        Ok(updated)
    }
}
