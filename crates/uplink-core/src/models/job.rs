//! Background jobs minted for finalized uploads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// `gs://` URI for an object key in a bucket.
pub fn gcs_uri(bucket: &str, object_key: &str) -> String {
    format!("gs://{}/{}", bucket, object_key)
}

/// A job created for a finalized upload. The task queue is the system of
/// record for job existence; nothing is persisted locally.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    pub gcs_path: String,
    /// Fully qualified name of the queue entry backing this job.
    pub task_id: String,
}

/// Body submitted to the task queue. Field names are the downstream
/// handler's wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub job_id: Uuid,
    pub gcs_path: String,
}
