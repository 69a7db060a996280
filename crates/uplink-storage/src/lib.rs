//! Uplink storage library
//!
//! Blob-store abstraction and backends. The `BlobStore` trait covers the two
//! capabilities the gateway needs from object storage: streaming an upload
//! body into an object, and producing time-boxed upload URLs. The GCS
//! backend is the production target; the local-filesystem backend serves
//! development and the integration tests.

pub mod gcs;
pub mod grants;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use gcs::GcsStore;
pub use grants::GrantIssuer;
pub use local::LocalStore;
pub use traits::{BlobStore, ByteStream, StorageError, StorageResult};
