//! Projection error types.

use thiserror::Error;

use crate::cache::CacheError;

/// Errors that can occur while recomputing derived caches.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// An error occurred in the datastore.
    #[error("Datastore error: {0}")]
    Datastore(#[from] datastore::DatastoreError),

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// No handler is registered for the task's procedure.
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    /// The task lacks a parameter its procedure needs.
    #[error("Task {procedure} is missing parameter {param}")]
    MissingParam {
        procedure: String,
        param: &'static str,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
