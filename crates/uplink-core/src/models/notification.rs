//! Pub/Sub push delivery envelope for storage notifications.
//!
//! These are statically declared wire types validated at the HTTP boundary.
//! The event source delivers at-least-once; the same finalize event may
//! arrive more than once, so nothing here is treated as unique. Fields are
//! optional with defaults: a delivery with missing attributes is filtered
//! out as irrelevant rather than rejected, so the source stops resending it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outer push envelope: one message plus the subscription it came from.
///
/// The `subscription` resource name is logged for diagnostics but not
/// verified; the bearer identity on the request is the authenticity boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PushEnvelope {
    pub message: PushMessage,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PushMessage {
    pub attributes: NotificationAttributes,
    /// Base64-encoded object metadata; unused by the pipeline.
    pub data: Option<String>,
    pub message_id: Option<String>,
    pub publish_time: Option<String>,
}

/// Storage notification attributes.
///
/// `object_generation` is kept as a string: push attributes are
/// string-valued on the wire regardless of their logical type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationAttributes {
    pub bucket_id: Option<String>,
    pub event_time: Option<String>,
    pub event_type: Option<String>,
    pub notification_config: Option<String>,
    pub object_id: Option<String>,
    pub object_generation: Option<String>,
    pub payload_format: Option<String>,
}
