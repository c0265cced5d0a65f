use crate::app::ports::{ObjectStore, PresignedUpload};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Filesystem-backed object store for local runs. Production deployments
/// point the same port at an S3-compatible store; keys and URLs are shaped
/// so the swap is invisible to callers.
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
    presign_ttl_minutes: i64,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            presign_ttl_minutes: 15,
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn presign_upload(&self, key: &str, _content_type: &str) -> Result<PresignedUpload> {
        // Local stand-in for an S3 presigned PUT: a one-off token in the URL.
        let token = Uuid::new_v4().simple().to_string();
        Ok(PresignedUpload {
            upload_url: format!("{}/upload/{}?token={}", self.base_url, key, token),
            object_key: key.to_string(),
            expires_at: Utc::now() + Duration::minutes(self.presign_ttl_minutes),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
