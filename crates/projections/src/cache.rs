//! Keyed string cache holding pre-rendered aggregates.
//!
//! An entry is absent, set, or deleted back to absent. Readers that must
//! not observe absence use [`CacheStoreExt::get_or_empty`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Cache key of the nearly-sold-out announcement.
pub const RECENT_ANNOUNCEMENTS_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Cache key of the featured speaker summary.
pub const FEATURED_SPEAKERS_KEY: &str = "FEATURED_SPEAKERS";

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// A process-wide key/value cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Removes an entry. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Extension trait providing convenience reads.
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Returns the cached value, or an empty string when absent.
    async fn get_or_empty(&self, key: &str) -> Result<String, CacheError> {
        Ok(self.get(key).await?.unwrap_or_default())
    }
}

impl<T: CacheStore + ?Sized> CacheStoreExt for T {}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        (**self).set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        (**self).delete(key).await
    }
}

/// In-memory cache.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries present.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lifecycle_absent_set_deleted() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.get_or_empty("k").await.unwrap(), "");

        cache.set("k", "v".into()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.is_empty().await);
    }
}
