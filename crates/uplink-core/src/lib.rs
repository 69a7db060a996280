//! Uplink core library
//!
//! Configuration, the error taxonomy, domain models, and the push-event
//! relevance filter. This crate performs no I/O; everything here is shared
//! by the storage, dispatch, and API crates.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use filter::{EventFilter, OBJECT_FINALIZE_EVENT};
