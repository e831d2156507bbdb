use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::TryStreamExt;

use crate::{Entity, EntityQuery, Key, Loaded, Result, StoredEntity, Transaction, Version};

/// A write to apply as part of a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// The entity to write.
    pub key: Key,

    /// Version the writer last read. If None, no version check is performed.
    /// `Version::initial()` expects the entity to be absent.
    pub expected_version: Option<Version>,

    /// The new properties of the entity.
    pub properties: serde_json::Value,
}

impl Mutation {
    /// Creates an unconditional write.
    pub fn put(key: Key, properties: serde_json::Value) -> Self {
        Self {
            key,
            expected_version: None,
            properties,
        }
    }

    /// Makes the write conditional on the entity still being at `version`.
    pub fn expect_version(mut self, version: Version) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// A lazily evaluated, ordered stream of query results.
pub type EntityStream = Pin<Box<dyn Stream<Item = Result<StoredEntity>> + Send>>;

/// Core trait for entity store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Allocates a fresh integer id for `kind` under `parent` and returns the key.
    async fn allocate_id(&self, parent: Option<&Key>, kind: &str) -> Result<Key>;

    /// Reads one entity.
    async fn get(&self, key: &Key) -> Result<Option<StoredEntity>>;

    /// Reads several entities, returning them in the order of `keys`.
    async fn get_multi(&self, keys: &[Key]) -> Result<Vec<Option<StoredEntity>>>;

    /// Applies mutations atomically - either all succeed or none do.
    ///
    /// Mutations may touch unrelated entity groups. If any mutation's
    /// expected version doesn't match, fails with `ConcurrencyConflict` and
    /// applies nothing. Returns the new version of each written entity.
    async fn commit(&self, mutations: Vec<Mutation>) -> Result<Vec<Version>>;

    /// Runs a query.
    ///
    /// Fails with `InvalidQuery` when the query breaks the range-index
    /// constraints checked by [`EntityQuery::validate`].
    async fn query(&self, query: EntityQuery) -> Result<EntityStream>;
}

/// Extension trait providing typed convenience methods for datastores.
#[async_trait]
pub trait DatastoreExt: Datastore {
    /// Writes a typed entity unconditionally.
    async fn put_entity<T: Entity>(&self, key: &Key, entity: &T) -> Result<Version> {
        let properties = serde_json::to_value(entity)?;
        let versions = self.commit(vec![Mutation::put(key.clone(), properties)]).await?;
        Ok(versions.into_iter().next().unwrap_or_default())
    }

    /// Reads and decodes a typed entity.
    async fn get_entity<T: Entity>(&self, key: &Key) -> Result<Option<Loaded<T>>> {
        match self.get(key).await? {
            Some(stored) => Ok(Some(Loaded::from_stored(stored)?)),
            None => Ok(None),
        }
    }

    /// Reads and decodes several typed entities, skipping missing ones.
    async fn get_entities<T: Entity>(&self, keys: &[Key]) -> Result<Vec<Loaded<T>>> {
        let mut loaded = Vec::with_capacity(keys.len());
        for stored in self.get_multi(keys).await?.into_iter().flatten() {
            loaded.push(Loaded::from_stored(stored)?);
        }
        Ok(loaded)
    }

    /// Runs a query and decodes every result.
    async fn query_entities<T: Entity>(&self, query: EntityQuery) -> Result<Vec<Loaded<T>>> {
        let stored: Vec<StoredEntity> = self.query(query).await?.try_collect().await?;
        stored.into_iter().map(Loaded::from_stored).collect()
    }

    /// Starts a transaction against this store.
    fn transaction(&self) -> Transaction<'_, Self> {
        Transaction::new(self)
    }
}

// Blanket implementation for all Datastore implementations
impl<T: Datastore + ?Sized> DatastoreExt for T {}
