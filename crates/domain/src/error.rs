//! Domain error types.

use datastore::DatastoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No identity could be resolved for the caller.
    #[error("Authorization required")]
    Unauthorized,

    /// A required field is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A query filter names an unknown field or operator, or is structurally invalid.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A dereferenced key does not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the entity.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate add, or capacity exhausted.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Optimistic transactions kept conflicting until the retry budget ran out.
    #[error("Transaction still contended after {attempts} attempts")]
    Contention { attempts: u32 },

    /// An error occurred in the datastore.
    #[error("Datastore error: {0}")]
    Datastore(#[from] DatastoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true for optimistic-concurrency conflicts raised at commit.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Datastore(e) if e.is_conflict())
    }
}
