//! Application setup and initialization
//!
//! All collaborators (blob store, grant issuer, token verifier, queue
//! client) are constructed here once and injected into the shared state.

pub mod routes;
pub mod server;

use crate::auth::{GoogleTokenVerifier, PushAuthenticator, TokenVerifier};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use uplink_core::{Config, EventFilter, StorageBackend};
use uplink_dispatch::{CloudTasksQueue, JobDispatcher, MetadataTokenProvider};
use uplink_storage::{BlobStore, GcsStore, GrantIssuer, LocalStore};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let blob_store = setup_blob_store(&config).await?;
    let grants = GrantIssuer::new(blob_store.clone(), config.bucket_prefix.clone());

    let verifier: Arc<dyn TokenVerifier> = Arc::new(GoogleTokenVerifier::new(
        config.jwks_url.clone(),
        Some(config.jwks_cache_ttl_seconds),
        config.push_auth_audience.clone(),
    )?);
    let authenticator =
        PushAuthenticator::new(verifier, config.storage_service_account_email.clone());

    let token_provider = Arc::new(MetadataTokenProvider::new(config.metadata_token_url.clone())?);
    let queue = Arc::new(CloudTasksQueue::new(
        token_provider,
        config.project_id.clone(),
        config.region.clone(),
        config.queue_name.clone(),
        config.task_handler_url.clone(),
        config.tasks_service_account_email.clone(),
    )?);
    let dispatcher = JobDispatcher::new(queue);

    let filter = EventFilter::new(config.bucket_name.clone(), &config.bucket_prefix);

    let state = Arc::new(AppState {
        config: config.clone(),
        blob_store,
        grants,
        authenticator,
        filter,
        dispatcher,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

async fn setup_blob_store(config: &Config) -> Result<Arc<dyn BlobStore>> {
    match config.storage_backend {
        StorageBackend::Gcs => {
            tracing::info!(bucket = %config.bucket_name, "Using GCS blob store");
            Ok(Arc::new(GcsStore::new(config.bucket_name.clone())?))
        }
        StorageBackend::Local => {
            let path = config
                .local_storage_path
                .clone()
                .context("LOCAL_STORAGE_PATH must be set for the local storage backend")?;
            let base_url = config.local_storage_base_url.clone().unwrap_or_else(|| {
                format!("http://localhost:{}/local", config.server_port)
            });
            tracing::info!(path = %path, "Using local blob store");
            Ok(Arc::new(LocalStore::new(path, base_url).await?))
        }
    }
}
