//! Signed upload URL issuance.
//!
//! Clients upload directly to the bucket with the returned credential; the
//! bucket's notification configuration calls us back when the object is
//! finalized, which is where the job pipeline picks up.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use uplink_core::models::GrantAction;
use uplink_core::AppError;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub gcs_path: String,
    pub signed_url: String,
    pub expected_content_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumableUrlResponse {
    pub gcs_path: String,
    pub session_url: String,
}

/// Issue a signed URL for a single-shot direct PUT upload.
#[utoipa::path(
    post,
    path = "/uploadSignedUrl",
    tag = "uploads",
    request_body = UploadUrlRequest,
    responses(
        (status = 201, description = "Signed URL issued", body = SignedUrlResponse,
            headers(("Location" = String, description = "The signed upload URL"))),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Signing failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(filename = %request.filename, operation = "create_signed_url")
)]
pub async fn create_signed_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let grant = state
        .grants
        .issue(
            &request.filename,
            GrantAction::Write,
            request.content_type.clone(),
        )
        .await
        .map_err(HttpAppError::from)?;

    let gcs_path = state.config.gcs_path(&request.filename);
    let expected_content_type = grant
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    tracing::info!(
        gcs_path = %gcs_path,
        expected_content_type = %expected_content_type,
        expires_at = %grant.expires_at,
        "Issued signed upload URL"
    );

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, grant.url.clone())],
        Json(SignedUrlResponse {
            gcs_path,
            signed_url: grant.url,
            expected_content_type,
        }),
    ))
}

/// Issue a URL against which the client opens a resumable upload session.
#[utoipa::path(
    post,
    path = "/uploadResumable",
    tag = "uploads",
    request_body = UploadUrlRequest,
    responses(
        (status = 201, description = "Session URL issued", body = ResumableUrlResponse,
            headers(("Location" = String, description = "The session URL"))),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Signing failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(filename = %request.filename, operation = "create_resumable_url")
)]
pub async fn create_resumable_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let grant = state
        .grants
        .issue(&request.filename, GrantAction::Resumable, None)
        .await
        .map_err(HttpAppError::from)?;

    let gcs_path = state.config.gcs_path(&request.filename);

    tracing::info!(
        gcs_path = %gcs_path,
        expires_at = %grant.expires_at,
        "Issued resumable session URL"
    );

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, grant.url.clone())],
        Json(ResumableUrlResponse {
            gcs_path,
            session_url: grant.url,
        }),
    ))
}
