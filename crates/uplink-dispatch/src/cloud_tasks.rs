//! Cloud Tasks queue backend.
//!
//! Tasks are created over the Cloud Tasks v2 REST API with an HTTP target
//! pointing at the configured task handler. The queue invokes the handler
//! under the configured service account's OIDC identity, so the handler can
//! verify that calls really originate from the queue.

use crate::token::AccessTokenProvider;
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uplink_core::models::TaskPayload;

const CLOUD_TASKS_API_BASE: &str = "https://cloudtasks.googleapis.com";

/// Task submission errors
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Queue misconfigured: {0}")]
    Config(String),

    #[error("Token acquisition failed: {0}")]
    Token(String),

    #[error("Queue request failed: {0}")]
    Transport(String),

    #[error("Queue rejected submission ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Outcome of a task submission. `created` is false when the queue already
/// held a task with the same name (a redelivered event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    /// Fully qualified task name assigned by the queue.
    pub name: String,
    pub created: bool,
}

/// Task queue abstraction.
///
/// Submitting the same `task_id` twice must be idempotent at the queue: the
/// second submission reports the existing entry instead of failing.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn submit(&self, task_id: &str, payload: &TaskPayload) -> DispatchResult<SubmittedTask>;
}

/// Cloud Tasks REST client.
pub struct CloudTasksQueue {
    http_client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
    api_base: String,
    project_id: String,
    region: String,
    queue_name: String,
    task_handler_url: String,
    /// Service account the queue uses to invoke the task handler.
    invoker_service_account: String,
}

impl CloudTasksQueue {
    pub fn new(
        token_provider: Arc<dyn AccessTokenProvider>,
        project_id: impl Into<String>,
        region: impl Into<String>,
        queue_name: impl Into<String>,
        task_handler_url: impl Into<String>,
        invoker_service_account: impl Into<String>,
    ) -> DispatchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DispatchError::Config(format!("Failed to create queue HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            token_provider,
            api_base: CLOUD_TASKS_API_BASE.to_string(),
            project_id: project_id.into(),
            region: region.into(),
            queue_name: queue_name.into(),
            task_handler_url: task_handler_url.into(),
            invoker_service_account: invoker_service_account.into(),
        })
    }

    /// Override the API endpoint (local emulators).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Fully qualified queue resource name.
    fn queue_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.region, self.queue_name
        )
    }

    fn task_name(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.queue_path(), task_id)
    }

    fn build_task_request(
        &self,
        task_id: &str,
        payload: &TaskPayload,
    ) -> DispatchResult<serde_json::Value> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| DispatchError::Config(format!("Failed to encode task payload: {}", e)))?;

        Ok(json!({
            "task": {
                "name": self.task_name(task_id),
                "httpRequest": {
                    "httpMethod": "POST",
                    "url": self.task_handler_url,
                    "headers": { "Content-Type": "application/json" },
                    "oidcToken": {
                        "serviceAccountEmail": self.invoker_service_account,
                    },
                    "body": base64::engine::general_purpose::STANDARD.encode(body),
                },
            }
        }))
    }
}

#[async_trait]
impl TaskQueue for CloudTasksQueue {
    async fn submit(&self, task_id: &str, payload: &TaskPayload) -> DispatchResult<SubmittedTask> {
        let request = self.build_task_request(task_id, payload)?;
        let url = format!("{}/v2/{}/tasks", self.api_base, self.queue_path());
        let token = self.token_provider.access_token().await?;

        tracing::debug!(
            queue = %self.queue_path(),
            task_id = %task_id,
            handler_url = %self.task_handler_url,
            "Submitting task"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();

        // A task with this name already exists: the event was redelivered
        // and the queue has collapsed it onto the original entry.
        if status == reqwest::StatusCode::CONFLICT {
            tracing::info!(
                task_id = %task_id,
                "Task already exists in queue, treating as submitted"
            );
            return Ok(SubmittedTask {
                name: self.task_name(task_id),
                created: false,
            });
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DispatchError::Transport(format!("Invalid queue response: {}", e)))?;

        let name = created
            .get("name")
            .and_then(|n| n.as_str())
            .map(String::from)
            .ok_or_else(|| {
                DispatchError::Rejected {
                    status: status.as_u16(),
                    detail: "Queue response did not include a task name".to_string(),
                }
            })?;

        tracing::info!(task_name = %name, "Task created in queue");

        Ok(SubmittedTask {
            name,
            created: true,
        })
    }
}
