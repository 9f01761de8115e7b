use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

use crate::angles::{repo::MeasurementStore, repo_types::MeasurementRecord};
use crate::auth::{jwt::JwtKeys, password, repo::CredentialStore, repo_types::UserRecord};
use crate::config::{AppConfig, JwtConfig};
use crate::db::{JsonFileStore, MemoryStore};
use crate::storage::{LocalStorage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: CredentialStore,
    pub angles: MeasurementStore,
    pub uploads: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let keys = JwtKeys::from_config(&config.jwt).context("build jwt keys")?;
        password::warm_up();

        let users = CredentialStore::new(Arc::new(JsonFileStore::<UserRecord>::new(
            &config.users_file,
        )));
        let angles = MeasurementStore::new(Arc::new(JsonFileStore::<MeasurementRecord>::new(
            &config.angles_file,
        )));
        let uploads: Arc<dyn StorageClient> =
            Arc::new(LocalStorage::new(&config.uploads_dir, "/uploads").await?);

        tracing::info!(
            users = %config.users_file.display(),
            angles = %config.angles_file.display(),
            uploads = %config.uploads_dir.display(),
            "stores ready"
        );

        Ok(Self {
            config,
            keys,
            users,
            angles,
            uploads,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        keys: JwtKeys,
        users: CredentialStore,
        angles: MeasurementStore,
        uploads: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            config,
            keys,
            users,
            angles,
            uploads,
        }
    }

    /// In-memory stores, a no-op upload sink and a fixed test signing key.
    pub fn fake() -> Self {
        #[derive(Clone)]
        struct FakeStorage;
        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
                Ok(())
            }
            fn public_url(&self, k: &str) -> String {
                format!("/uploads/{}", k)
            }
        }

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: PathBuf::from("unused/users.json"),
            angles_file: PathBuf::from("unused/angleData.json"),
            uploads_dir: PathBuf::from("unused/uploads"),
            max_upload_bytes: 1024 * 1024,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
        });

        let keys = JwtKeys::from_config(&config.jwt).expect("test jwt config ok");

        Self::from_parts(
            config,
            keys,
            CredentialStore::new(Arc::new(MemoryStore::<UserRecord>::new())),
            MeasurementStore::new(Arc::new(MemoryStore::<MeasurementRecord>::new())),
            Arc::new(FakeStorage),
        )
    }
}
