//! Push notification receiver: the authenticate → filter → dispatch pipeline.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use uplink_core::models::PushEnvelope;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub job_id: Uuid,
    pub task_id: String,
    pub gcs_path: String,
}

/// Receive a storage push notification and turn it into a background job.
///
/// Authentication is a strict precondition: filtering and dispatch only run
/// on a verified request. Irrelevant events are acknowledged with 200 so the
/// push source stops redelivering them; a dispatch failure returns 500 and
/// leaves the retry to the source's redelivery, which re-enters this
/// pipeline from the top.
#[utoipa::path(
    post,
    path = "/uploadNotification",
    tag = "notifications",
    request_body = PushEnvelope,
    responses(
        (status = 200, description = "Event acknowledged, no job created"),
        (status = 201, description = "Job created", body = NotificationResponse),
        (status = 401, description = "Authentication failure", body = ErrorResponse),
        (status = 500, description = "Dispatch failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, envelope), fields(operation = "upload_notification"))]
pub async fn upload_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(envelope): ValidatedJson<PushEnvelope>,
) -> Result<Response, HttpAppError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let claim = state
        .authenticator
        .authenticate(authorization)
        .await
        .map_err(HttpAppError::from)?;

    let attributes = &envelope.message.attributes;
    tracing::info!(
        message_id = ?envelope.message.message_id,
        subscription = ?envelope.subscription,
        event_type = ?attributes.event_type,
        bucket_id = ?attributes.bucket_id,
        object_id = ?attributes.object_id,
        notifier = ?claim.email,
        "Received upload notification"
    );

    if !state.filter.is_relevant(attributes) {
        // Acknowledged as handled so the source stops resending it.
        tracing::debug!(
            event_type = ?attributes.event_type,
            bucket_id = ?attributes.bucket_id,
            object_id = ?attributes.object_id,
            "Ignoring irrelevant notification"
        );
        return Ok(StatusCode::OK.into_response());
    }

    // Relevance guarantees bucket and object ids are present.
    let bucket_id = attributes.bucket_id.as_deref().unwrap_or_default();
    let object_id = attributes.object_id.as_deref().unwrap_or_default();
    let object_generation = attributes.object_generation.as_deref().unwrap_or_default();

    let job = state
        .dispatcher
        .dispatch(bucket_id, object_id, object_generation)
        .await
        .map_err(HttpAppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse {
            job_id: job.job_id,
            task_id: job.task_id,
            gcs_path: job.gcs_path,
        }),
    )
        .into_response())
}
