//! Core projection trait.

use async_trait::async_trait;
use domain::Task;

use crate::Result;

/// What a recompute decided for its cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheUpdate {
    /// Store this rendered value.
    Set(String),
    /// Remove the entry.
    Delete,
    /// Leave the entry as it is.
    Unchanged,
}

/// A derived aggregate recomputed from authoritative entity state.
///
/// Recomputes never apply deltas, so running one zero or more times, or
/// concurrently with itself, converges on the same cache contents.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Returns the task procedure that triggers this projection.
    fn procedure(&self) -> &'static str;

    /// Returns the cache key this projection maintains.
    fn cache_key(&self) -> &'static str;

    /// Reads current state and decides the new cache contents.
    async fn recompute(&self, task: &Task) -> Result<CacheUpdate>;
}
