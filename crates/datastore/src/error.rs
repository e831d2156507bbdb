use common::KeyError;
use thiserror::Error;

use crate::{Key, Version};

/// Errors that can occur when interacting with the datastore.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// A transaction read an entity that was modified before commit.
    /// The expected version did not match the stored version.
    #[error("Concurrency conflict for entity {key}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        key: Key,
        expected: Version,
        actual: Version,
    },

    /// The query violates a structural constraint of the store.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An entity was stored under a key of a different kind.
    #[error("Kind mismatch for {key}: expected {expected}")]
    KindMismatch { key: Key, expected: &'static str },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A key could not be decoded.
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

impl DatastoreError {
    /// Returns true for optimistic-concurrency failures that a caller may retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DatastoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for datastore operations.
pub type Result<T> = std::result::Result<T, DatastoreError>;
