//! Blob store abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream fed into [`BlobStore::put_stream`]. Errors from the producer
/// side (e.g. a client disconnecting mid-upload) arrive as `io::Error` items.
pub type ByteStream<'a> = &'a mut (dyn Stream<Item = io::Result<Bytes>> + Send + Unpin);

/// Blob store abstraction trait
///
/// Object keys are `{prefix}/{filename}` and must not contain `..` or a
/// leading `/`. Signing is a capability of the backing store; backends that
/// cannot sign return `SigningFailed`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stream a request body into the object at `key`.
    ///
    /// The copy must propagate backpressure: the producer is not polled
    /// faster than the store accepts writes. An error on either side aborts
    /// the other promptly; partially written object state is the store's
    /// responsibility to reconcile. Returns the number of bytes written.
    async fn put_stream(&self, key: &str, data: ByteStream<'_>) -> StorageResult<u64>;

    /// Time-boxed URL authorizing a single direct PUT of the object body.
    async fn signed_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Time-boxed URL against which a client opens a resumable upload
    /// session.
    async fn resumable_session_url(&self, key: &str, expires_in: Duration)
        -> StorageResult<String>;
}

/// Reject keys that could escape the configured prefix.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_and_absolute_keys() {
        assert!(validate_key("upload/../secrets").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("upload/f.png").is_ok());
    }
}
