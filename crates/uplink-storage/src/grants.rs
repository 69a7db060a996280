//! Upload grant issuance.

use crate::traits::{BlobStore, StorageError, StorageResult};
use std::sync::Arc;
use uplink_core::models::{GrantAction, UploadGrant, GRANT_TTL};

/// Issues short-lived upload grants bound to `{prefix}/{object_name}`.
///
/// Stateless: every call goes straight to the store's signing capability.
/// Signing failures are surfaced unretried; the caller maps them to a 500.
#[derive(Clone)]
pub struct GrantIssuer {
    store: Arc<dyn BlobStore>,
    prefix: String,
}

impl GrantIssuer {
    pub fn new(store: Arc<dyn BlobStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Content type the uploader is expected to send with a write grant.
    /// Derived from the filename extension when the caller did not supply
    /// one; unknown extensions fall back to a generic binary type.
    pub fn expected_content_type(object_name: &str, content_type: Option<String>) -> String {
        content_type.unwrap_or_else(|| {
            mime_guess::from_path(object_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }

    pub async fn issue(
        &self,
        object_name: &str,
        action: GrantAction,
        content_type: Option<String>,
    ) -> StorageResult<UploadGrant> {
        if object_name.is_empty() {
            return Err(StorageError::InvalidKey(
                "Object name must not be empty".to_string(),
            ));
        }
        let object_key = format!("{}/{}", self.prefix, object_name);
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(GRANT_TTL.as_secs() as i64);

        match action {
            GrantAction::Write => {
                let expected = Self::expected_content_type(object_name, content_type);
                let url = self
                    .store
                    .signed_put_url(&object_key, &expected, GRANT_TTL)
                    .await?;

                tracing::info!(
                    object_key = %object_key,
                    action = %action,
                    expected_content_type = %expected,
                    "Issued write grant"
                );

                Ok(UploadGrant {
                    object_key,
                    action,
                    url,
                    expires_at,
                    content_type: Some(expected),
                })
            }
            GrantAction::Resumable => {
                let url = self
                    .store
                    .resumable_session_url(&object_key, GRANT_TTL)
                    .await?;

                tracing::info!(
                    object_key = %object_key,
                    action = %action,
                    "Issued resumable grant"
                );

                Ok(UploadGrant {
                    object_key,
                    action,
                    url,
                    expires_at,
                    content_type,
                })
            }
        }
    }
}
