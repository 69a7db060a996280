//! Upload grants: short-lived credentials for direct-to-bucket uploads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use utoipa::ToSchema;

/// Validity window for every issued grant.
pub const GRANT_TTL: Duration = Duration::from_secs(15 * 60);

/// Upload action a grant authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GrantAction {
    /// Single-shot direct PUT of the object body.
    Write,
    /// Multi-step upload session (client opens the session against the URL).
    Resumable,
}

impl fmt::Display for GrantAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantAction::Write => write!(f, "write"),
            GrantAction::Resumable => write!(f, "resumable"),
        }
    }
}

/// A time-boxed credential authorizing one upload action against one object
/// key. Created on demand, never persisted, immutable once issued.
#[derive(Debug, Clone)]
pub struct UploadGrant {
    pub object_key: String,
    pub action: GrantAction,
    pub url: String,
    pub expires_at: DateTime<Utc>,
    /// Content type the uploader is expected to send (write grants only).
    pub content_type: Option<String>,
}
