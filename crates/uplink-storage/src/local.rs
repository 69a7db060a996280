//! Local filesystem backend for development and tests.

use crate::traits::{validate_key, BlobStore, ByteStream, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Filesystem-backed blob store.
///
/// "Signed" URLs from this backend are unsigned base-url/key URLs carrying a
/// random token; there is no local signing capability. Use only for
/// development and tests.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn put_stream(&self, key: &str, data: ByteStream<'_>) -> StorageResult<u64> {
        let path = self.key_to_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        let mut size_bytes: u64 = 0;

        while let Some(chunk) = data.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = fs::remove_file(&path).await;
                    return Err(StorageError::UploadFailed(format!(
                        "Upload stream aborted: {}",
                        e
                    )));
                }
            };
            size_bytes += chunk.len() as u64;
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(StorageError::IoError(e));
            }
        }

        file.flush().await?;

        tracing::info!(
            key = %key,
            size_bytes,
            path = %path.display(),
            "Local stream upload successful"
        );

        Ok(size_bytes)
    }

    async fn signed_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!(
            "{}/{}?upload_token={}&expires_in={}",
            self.base_url,
            key,
            Uuid::new_v4(),
            expires_in.as_secs()
        ))
    }

    async fn resumable_session_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!(
            "{}/{}?session_token={}&expires_in={}",
            self.base_url,
            key,
            Uuid::new_v4(),
            expires_in.as_secs()
        ))
    }
}
