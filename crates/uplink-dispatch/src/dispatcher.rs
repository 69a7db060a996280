//! Job dispatch for finalized uploads.

use crate::cloud_tasks::{DispatchResult, TaskQueue};
use std::sync::Arc;
use uplink_core::models::{gcs_uri, Job, TaskPayload};
use uuid::Uuid;

/// Mints a job per authenticated, relevant finalize notification and submits
/// it to the task queue.
///
/// The job id is derived deterministically from the object's identity, so
/// redeliveries of the same finalize event map onto the same queue entry
/// instead of fanning out into duplicate jobs. Submission failures are not
/// retried here; the event source redelivers and the pipeline runs again.
#[derive(Clone)]
pub struct JobDispatcher {
    queue: Arc<dyn TaskQueue>,
}

impl JobDispatcher {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self { queue }
    }

    /// Deterministic job id for one physical finalize event.
    pub fn job_id_for(bucket_id: &str, object_id: &str, object_generation: &str) -> Uuid {
        let identity = format!("gs://{}/{}#{}", bucket_id, object_id, object_generation);
        Uuid::new_v5(&Uuid::NAMESPACE_URL, identity.as_bytes())
    }

    #[tracing::instrument(skip(self))]
    pub async fn dispatch(
        &self,
        bucket_id: &str,
        object_id: &str,
        object_generation: &str,
    ) -> DispatchResult<Job> {
        let job_id = Self::job_id_for(bucket_id, object_id, object_generation);
        let gcs_path = gcs_uri(bucket_id, object_id);
        let payload = TaskPayload {
            job_id,
            gcs_path: gcs_path.clone(),
        };

        tracing::info!(
            job_id = %job_id,
            gcs_path = %gcs_path,
            "Creating job for finalized object"
        );

        let submitted = self
            .queue
            .submit(&job_id.to_string(), &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    job_id = %job_id,
                    gcs_path = %gcs_path,
                    "Task submission failed"
                );
                e
            })?;

        if submitted.created {
            tracing::info!(
                job_id = %job_id,
                task_id = %submitted.name,
                "Created job task"
            );
        } else {
            tracing::info!(
                job_id = %job_id,
                task_id = %submitted.name,
                "Redelivered event collapsed onto existing task"
            );
        }

        Ok(Job {
            job_id,
            gcs_path,
            task_id: submitted.name,
        })
    }
}
