//! Direct multipart upload, streamed straight into the blob store.

use std::io;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use uplink_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub gcs_path: String,
}

/// Accept a single multipart file upload and pipe it into the blob store.
///
/// The body is copied chunk by chunk under the store's backpressure: the
/// request stream is only polled as fast as the store accepts writes, and an
/// error on either side aborts the other. Upload with
/// `curl -F 'file=@/path/to/file' <url>`.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file part in request", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }

        let object_key = state.config.object_key(&filename);
        let gcs_path = state.config.gcs_path(&filename);

        tracing::info!(
            filename = %filename,
            gcs_path = %gcs_path,
            "Uploading file"
        );

        let mut data = Box::pin(field.map_err(io::Error::other));
        let size_bytes = state
            .blob_store
            .put_stream(&object_key, &mut data)
            .await
            .map_err(HttpAppError::from)?;

        tracing::info!(
            gcs_path = %gcs_path,
            size_bytes,
            "Upload complete"
        );

        return Ok((StatusCode::CREATED, Json(UploadResponse { gcs_path })));
    }

    Err(HttpAppError(AppError::BadRequest(
        "No file part in request".to_string(),
    )))
}
