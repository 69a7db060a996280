//! Relevance filtering for storage push notifications.

use crate::models::NotificationAttributes;

/// Event type emitted when an object upload has completed durably.
pub const OBJECT_FINALIZE_EVENT: &str = "OBJECT_FINALIZE";

/// Decides whether an authenticated notification concerns this service.
///
/// An event is relevant only if it is a finalize event, for the configured
/// bucket, for an object under the configured prefix. Irrelevant events are
/// acknowledged by the caller (HTTP 200) so the push source stops
/// redelivering them. Relevance has no side effects.
#[derive(Debug, Clone)]
pub struct EventFilter {
    bucket: String,
    object_prefix: String,
}

impl EventFilter {
    pub fn new(bucket: impl Into<String>, prefix: &str) -> Self {
        Self {
            bucket: bucket.into(),
            object_prefix: format!("{}/", prefix.trim_end_matches('/')),
        }
    }

    pub fn is_relevant(&self, attributes: &NotificationAttributes) -> bool {
        if attributes.event_type.as_deref() != Some(OBJECT_FINALIZE_EVENT) {
            return false;
        }
        if attributes.bucket_id.as_deref() != Some(self.bucket.as_str()) {
            return false;
        }
        attributes
            .object_id
            .as_deref()
            .is_some_and(|id| id.starts_with(&self.object_prefix))
    }
}
