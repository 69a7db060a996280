//! Access tokens for calling the Cloud Tasks API.

use crate::cloud_tasks::{DispatchError, DispatchResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default GCE/Cloud Run metadata endpoint for the attached service
/// account's access token.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of OAuth access tokens for queue API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> DispatchResult<String>;
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Fetches access tokens from the GCE metadata server, caching them until
/// shortly before expiry.
pub struct MetadataTokenProvider {
    token_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

impl MetadataTokenProvider {
    /// `token_url` overrides the metadata endpoint (used in tests); `None`
    /// uses the standard metadata server address.
    pub fn new(token_url: Option<String>) -> DispatchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DispatchError::Config(format!("Failed to create metadata HTTP client: {}", e))
            })?;

        Ok(Self {
            token_url: token_url.unwrap_or_else(|| METADATA_TOKEN_URL.to_string()),
            http_client,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_token(&self) -> DispatchResult<CachedToken> {
        let response = self
            .http_client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| DispatchError::Token(format!("Metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(DispatchError::Token(format!(
                "Metadata server returned {}",
                response.status()
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::Token(format!("Invalid metadata token response: {}", e)))?;

        Ok(CachedToken {
            token: body.access_token,
            expires_at: Utc::now()
                + chrono::Duration::seconds((body.expires_in - EXPIRY_MARGIN_SECS).max(0)),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataTokenProvider {
    async fn access_token(&self) -> DispatchResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();

        {
            let mut cache = self.cache.write().await;
            *cache = Some(fresh);
        }

        tracing::debug!("Refreshed queue access token from metadata server");
        Ok(token)
    }
}

/// Fixed-token provider for tests and local development.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> DispatchResult<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_configured_token() {
        let provider = StaticTokenProvider::new("test-token");
        assert_eq!(provider.access_token().await.unwrap(), "test-token");
    }

    #[test]
    fn metadata_token_response_shape() {
        let body: MetadataTokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "ya29.abc",
            "expires_in": 3599,
            "token_type": "Bearer"
        }))
        .expect("deserialize");
        assert_eq!(body.access_token, "ya29.abc");
        assert_eq!(body.expires_in, 3599);
    }
}
