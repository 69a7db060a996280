//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use uplink_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Uplink API",
        version = "0.1.0",
        description = "Upload orchestration gateway: issues time-limited signed upload URLs, streams direct uploads into the bucket, and converts storage push notifications into background jobs. The notification endpoint requires a bearer identity token minted by the push subscription."
    ),
    paths(
        handlers::health::ping,
        handlers::upload::upload_file,
        handlers::signed_url::create_signed_url,
        handlers::signed_url::create_resumable_url,
        handlers::notification::upload_notification,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::upload::UploadResponse,
        handlers::signed_url::UploadUrlRequest,
        handlers::signed_url::SignedUrlResponse,
        handlers::signed_url::ResumableUrlResponse,
        handlers::notification::NotificationResponse,
        models::PushEnvelope,
        models::PushMessage,
        models::NotificationAttributes,
    )),
    tags(
        (name = "health", description = "Liveness probes"),
        (name = "uploads", description = "Direct and signed-URL uploads"),
        (name = "notifications", description = "Storage push notification intake")
    )
)]
pub struct ApiDoc;
