//! Domain models

pub mod claims;
pub mod grant;
pub mod job;
pub mod notification;

pub use claims::IdentityClaim;
pub use grant::{GrantAction, UploadGrant, GRANT_TTL};
pub use job::{gcs_uri, Job, TaskPayload};
pub use notification::{NotificationAttributes, PushEnvelope, PushMessage};
