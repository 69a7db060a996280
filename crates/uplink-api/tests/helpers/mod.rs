//! Test helpers: build AppState and router for integration tests.
//!
//! Collaborators with external dependencies are replaced by doubles: a
//! tempdir-backed local blob store, a recording in-memory queue that mimics
//! task-name deduplication, and a token verifier that accepts a fixed set of
//! test tokens.

use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uplink_api::auth::{PushAuthenticator, TokenVerifier};
use uplink_api::setup::routes::setup_routes;
use uplink_api::state::AppState;
use uplink_core::config::GOOGLE_JWKS_URL;
use uplink_core::models::{IdentityClaim, TaskPayload};
use uplink_core::{AppError, Config, EventFilter, StorageBackend};
use uplink_dispatch::{DispatchError, DispatchResult, JobDispatcher, SubmittedTask, TaskQueue};
use uplink_storage::{GrantIssuer, LocalStore};

pub const BUCKET: &str = "media-uploads";
pub const PREFIX: &str = "upload";
pub const NOTIFIER_EMAIL: &str = "pubsub@demo-project.iam.gserviceaccount.com";

pub const VALID_TOKEN: &str = "valid-push-token";
pub const UNVERIFIED_TOKEN: &str = "unverified-push-token";
pub const WRONG_IDENTITY_TOKEN: &str = "wrong-identity-push-token";

/// Queue double that records submissions and collapses duplicate task names,
/// like the real queue does.
#[derive(Default)]
pub struct RecordingQueue {
    pub submissions: Mutex<Vec<(String, TaskPayload)>>,
}

impl RecordingQueue {
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_payload(&self) -> Option<TaskPayload> {
        self.submissions
            .lock()
            .unwrap()
            .last()
            .map(|(_, payload)| payload.clone())
    }
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn submit(&self, task_id: &str, payload: &TaskPayload) -> DispatchResult<SubmittedTask> {
        let mut submissions = self.submissions.lock().unwrap();
        let created = !submissions.iter().any(|(id, _)| id == task_id);
        if created {
            submissions.push((task_id.to_string(), payload.clone()));
        }
        Ok(SubmittedTask {
            name: format!(
                "projects/demo-project/locations/us-central1/queues/upload-jobs/tasks/{}",
                task_id
            ),
            created,
        })
    }
}

/// Queue double that always fails, for dispatch-error tests.
pub struct FailingQueue;

#[async_trait]
impl TaskQueue for FailingQueue {
    async fn submit(&self, _task_id: &str, _payload: &TaskPayload) -> DispatchResult<SubmittedTask> {
        Err(DispatchError::Rejected {
            status: 429,
            detail: "RESOURCE_EXHAUSTED: queue over quota".to_string(),
        })
    }
}

/// Verifier double accepting a fixed set of test tokens.
pub struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaim, AppError> {
        let claim = |email: &str, verified: bool| IdentityClaim {
            email: Some(email.to_string()),
            email_verified: verified,
            aud: None,
            iss: Some("https://accounts.google.com".to_string()),
            sub: Some("1234567890".to_string()),
            exp: Some(4102444800),
        };
        match token {
            VALID_TOKEN => Ok(claim(NOTIFIER_EMAIL, true)),
            UNVERIFIED_TOKEN => Ok(claim(NOTIFIER_EMAIL, false)),
            WRONG_IDENTITY_TOKEN => Ok(claim("intruder@example.com", true)),
            _ => Err(AppError::Unauthorized(
                "Invalid or expired token".to_string(),
            )),
        }
    }
}

fn test_config(storage_path: &std::path::Path) -> Config {
    Config {
        server_port: 8000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        storage_backend: StorageBackend::Local,
        bucket_name: BUCKET.to_string(),
        bucket_prefix: PREFIX.to_string(),
        local_storage_path: Some(storage_path.display().to_string()),
        local_storage_base_url: Some("http://localhost:8000/local".to_string()),
        max_upload_size_bytes: 32 * 1024 * 1024,
        queue_name: "upload-jobs".to_string(),
        project_id: "demo-project".to_string(),
        region: "us-central1".to_string(),
        task_handler_url: "https://handler.example.com/task".to_string(),
        tasks_service_account_email: "tasks@demo-project.iam.gserviceaccount.com".to_string(),
        storage_service_account_email: NOTIFIER_EMAIL.to_string(),
        push_auth_audience: None,
        jwks_url: GOOGLE_JWKS_URL.to_string(),
        jwks_cache_ttl_seconds: 3600,
        metadata_token_url: None,
    }
}

/// Test application: server, queue double, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub queue: Arc<RecordingQueue>,
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Path where an uploaded object lands in the local store.
    pub fn stored_object_path(&self, filename: &str) -> std::path::PathBuf {
        self.temp_dir.path().join(PREFIX).join(filename)
    }
}

/// Setup test app with isolated local storage and a recording queue.
pub async fn setup_test_app() -> TestApp {
    let queue = Arc::new(RecordingQueue::default());
    let (server, temp_dir) = setup_test_server(queue.clone()).await;
    TestApp {
        server,
        queue,
        temp_dir,
    }
}

/// Setup a test server around an arbitrary queue double.
pub async fn setup_test_server(queue: Arc<dyn TaskQueue>) -> (TestServer, TempDir) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = test_config(temp_dir.path());

    let blob_store = Arc::new(
        LocalStore::new(
            temp_dir.path(),
            config
                .local_storage_base_url
                .clone()
                .expect("base url set in test config"),
        )
        .await
        .expect("create local store"),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        blob_store: blob_store.clone(),
        grants: GrantIssuer::new(blob_store, config.bucket_prefix.clone()),
        authenticator: PushAuthenticator::new(
            Arc::new(StaticVerifier),
            config.storage_service_account_email.clone(),
        ),
        filter: EventFilter::new(config.bucket_name.clone(), &config.bucket_prefix),
        dispatcher: JobDispatcher::new(queue),
    });

    let router = setup_routes(&config, state).expect("build router");
    let server = TestServer::new(router).expect("start test server");

    (server, temp_dir)
}

/// Push envelope body in the wire shape the event source delivers.
pub fn push_envelope(event_type: &str, bucket_id: &str, object_id: &str) -> serde_json::Value {
    push_envelope_with_generation(event_type, bucket_id, object_id, "1714564800000000")
}

pub fn push_envelope_with_generation(
    event_type: &str,
    bucket_id: &str,
    object_id: &str,
    generation: &str,
) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "attributes": {
                "bucketId": bucket_id,
                "eventTime": "2024-05-01T12:00:00.000Z",
                "eventType": event_type,
                "notificationConfig": format!("projects/_/buckets/{}/notificationConfigs/1", bucket_id),
                "objectId": object_id,
                "objectGeneration": generation,
                "payloadFormat": "JSON_API_V1"
            },
            "data": "eyJuYW1lIjoidXBsb2FkL2YucG5nIn0=",
            "messageId": "11735362277363960",
            "publishTime": "2024-05-01T12:00:01.123Z"
        },
        "subscription": "projects/demo-project/subscriptions/upload-events"
    })
}
