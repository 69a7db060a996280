//! Application state
//!
//! All collaborators are constructed once at startup and injected here;
//! handlers never reach for ambient globals. Everything in this struct is
//! read-only after initialization.

use crate::auth::PushAuthenticator;
use std::sync::Arc;
use uplink_core::{Config, EventFilter};
use uplink_dispatch::JobDispatcher;
use uplink_storage::{BlobStore, GrantIssuer};

pub struct AppState {
    pub config: Config,
    pub blob_store: Arc<dyn BlobStore>,
    pub grants: GrantIssuer,
    pub authenticator: PushAuthenticator,
    pub filter: EventFilter,
    pub dispatcher: JobDispatcher,
}
