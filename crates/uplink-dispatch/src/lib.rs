//! Uplink dispatch library
//!
//! Task-queue submission: the `TaskQueue` trait with its Cloud Tasks REST
//! backend, access-token acquisition for calling the queue API, and the
//! `JobDispatcher` that mints jobs for finalized uploads.

pub mod cloud_tasks;
pub mod dispatcher;
pub mod token;

// Re-export commonly used types
pub use cloud_tasks::{CloudTasksQueue, DispatchError, DispatchResult, SubmittedTask, TaskQueue};
pub use dispatcher::JobDispatcher;
pub use token::{AccessTokenProvider, MetadataTokenProvider, StaticTokenProvider};
