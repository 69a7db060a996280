//! Google Cloud Storage backend over `object_store`.

use crate::traits::{validate_key, BlobStore, ByteStream, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use http::Method;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStore, ObjectStoreExt, WriteMultipart};
use std::time::Duration;

/// GCS blob store.
///
/// Credentials come from the environment (service account file or metadata
/// server), resolved by `object_store`'s builder. Signed URLs require the
/// signing identity to hold `iam.serviceAccounts.signBlob`.
#[derive(Debug)]
pub struct GcsStore {
    store: GoogleCloudStorage,
    bucket: String,
}

impl GcsStore {
    pub fn new(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(GcsStore { store, bucket })
    }
}

#[async_trait]
impl BlobStore for GcsStore {
    async fn put_stream(&self, key: &str, data: ByteStream<'_>) -> StorageResult<u64> {
        validate_key(key)?;
        let location = Path::from(key);
        let start = std::time::Instant::now();

        let upload = self
            .store
            .put_multipart(&location)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new(upload);
        let mut size_bytes: u64 = 0;

        while let Some(chunk) = data.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    // Source side failed (e.g. client disconnect): abort the
                    // destination write before surfacing the error.
                    let _ = writer.abort().await;
                    tracing::warn!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %key,
                        bytes_received = size_bytes,
                        "Upload stream aborted by source"
                    );
                    return Err(StorageError::UploadFailed(format!(
                        "Upload stream aborted: {}",
                        e
                    )));
                }
            };

            // Suspends until the store accepts more data, so a slow write
            // stalls the read side instead of buffering unboundedly.
            writer
                .wait_for_capacity(1)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            size_bytes += chunk.len() as u64;
            writer.write(&chunk);
        }

        writer
            .finish()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS stream upload successful"
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
        let location = Path::from(key);

        let url = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "GCS signed URL generation failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "Generated PUT signed URL"
        );

        Ok(url.to_string())
    }

    async fn resumable_session_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let location = Path::from(key);

        // Resumable uploads open a session with a signed POST against the
        // object; the client sends `x-goog-resumable: start` and follows the
        // session URL the store returns.
        let url = self
            .store
            .signed_url(Method::POST, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "GCS resumable session URL generation failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "Generated resumable session URL"
        );

        Ok(url.to_string())
    }
}
