//! Whole-container record persistence.
//!
//! A [`RecordStore`] holds one ordered sequence of records. Every access loads
//! the full sequence and every write replaces it, which keeps the contract the
//! same whether the backing container is a JSON file or something else.

use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed container {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StorageError>;
    async fn save(&self, records: &[T]) -> Result<(), StorageError>;
}

/// JSON array on disk, rewritten in full on every save.
///
/// A missing file (or one holding only whitespace) reads as an empty
/// sequence; any other unparsable content is [`StorageError::Malformed`].
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }

        // Write next to the target and rename so readers never see a partial file.
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.io_err(e))?;
        file.write_all(body.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        file.sync_all().await.map_err(|e| self.io_err(e))?;
        drop(file);
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_err(e))?;

        debug!(path = %self.path.display(), count = records.len(), "container rewritten");
        Ok(())
    }
}

/// In-process store used by tests and `AppState::fake`.
pub struct MemoryStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }
}
