use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::fs;

/// Object storage for uploaded images.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// Path under which clients can fetch the object.
    fn public_url(&self, key: &str) -> String;
}

/// Stores objects as flat files under `root`, served at `url_prefix`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>, url_prefix: &str) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create uploads dir {}", root.display()))?;
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(
            !key.is_empty() && !key.contains(['/', '\\']) && key != "." && key != "..",
            "invalid object key {key:?}"
        );
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.object_path(key)?;
        fs::write(&path, &body)
            .await
            .with_context(|| format!("write object {}", path.display()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key)
    }
}
