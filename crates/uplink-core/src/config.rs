//! Configuration module
//!
//! Environment-backed configuration for the gateway: bucket/prefix targets,
//! Cloud Tasks queue coordinates, and the identities involved in the push
//! notification pipeline. Loaded once at startup and shared read-only.

use std::env;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BUCKET_PREFIX: &str = "upload";
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 512;
const DEFAULT_JWKS_CACHE_TTL_SECS: i64 = 3600;

/// Google's JWKS endpoint for ID tokens minted by the push subscription.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Blob store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    Local,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Blob store
    pub storage_backend: StorageBackend,
    pub bucket_name: String,
    pub bucket_prefix: String,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub max_upload_size_bytes: usize,
    // Task queue
    pub queue_name: String,
    pub project_id: String,
    pub region: String,
    pub task_handler_url: String,
    /// Service account the queue uses to invoke the task handler.
    pub tasks_service_account_email: String,
    // Push notification authentication
    /// Service account the push subscription uses to call us.
    pub storage_service_account_email: String,
    pub push_auth_audience: Option<String>,
    pub jwks_url: String,
    pub jwks_cache_ttl_seconds: i64,
    /// Override for the GCE metadata token endpoint (used in tests).
    pub metadata_token_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend =
            match env::var("STORAGE_BACKEND").unwrap_or_default().to_lowercase().as_str() {
                "local" => StorageBackend::Local,
                _ => StorageBackend::Gcs,
            };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            storage_backend,
            bucket_name: env::var("BUCKET_NAME").unwrap_or_default(),
            bucket_prefix: env::var("BUCKET_PREFIX")
                .unwrap_or_else(|_| DEFAULT_BUCKET_PREFIX.to_string()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            queue_name: env::var("QUEUE_NAME").unwrap_or_default(),
            project_id: env::var("PROJECT_ID").unwrap_or_default(),
            region: env::var("REGION").unwrap_or_default(),
            task_handler_url: env::var("TASK_HANDLER_URL").unwrap_or_default(),
            tasks_service_account_email: env::var("TASKS_SERVICE_ACCOUNT_EMAIL")
                .unwrap_or_default(),
            storage_service_account_email: env::var("STORAGE_SERVICE_ACCOUNT_EMAIL")
                .unwrap_or_default(),
            push_auth_audience: env::var("PUSH_AUTH_AUDIENCE").ok().filter(|s| !s.is_empty()),
            jwks_url: env::var("JWKS_URL").unwrap_or_else(|_| GOOGLE_JWKS_URL.to_string()),
            jwks_cache_ttl_seconds: env::var("JWKS_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_JWKS_CACHE_TTL_SECS),
            metadata_token_url: env::var("METADATA_TOKEN_URL").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.bucket_prefix.is_empty() || self.bucket_prefix.contains('/') {
            return Err(anyhow::anyhow!(
                "BUCKET_PREFIX must be a single non-empty path segment"
            ));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using the local storage backend"
            ));
        }

        if self.is_production() {
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
            for (name, value) in [
                ("BUCKET_NAME", &self.bucket_name),
                ("QUEUE_NAME", &self.queue_name),
                ("PROJECT_ID", &self.project_id),
                ("REGION", &self.region),
                ("TASK_HANDLER_URL", &self.task_handler_url),
                (
                    "TASKS_SERVICE_ACCOUNT_EMAIL",
                    &self.tasks_service_account_email,
                ),
                (
                    "STORAGE_SERVICE_ACCOUNT_EMAIL",
                    &self.storage_service_account_email,
                ),
            ] {
                if value.is_empty() {
                    return Err(anyhow::anyhow!("{} must be set in production", name));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Object key for a filename under the configured prefix.
    pub fn object_key(&self, filename: &str) -> String {
        format!("{}/{}", self.bucket_prefix, filename)
    }

    /// `gs://` URI for a filename under the configured bucket and prefix.
    pub fn gcs_path(&self, filename: &str) -> String {
        crate::models::gcs_uri(&self.bucket_name, &self.object_key(filename))
    }
}
