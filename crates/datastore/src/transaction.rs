use std::collections::{BTreeMap, HashMap};

use crate::{Datastore, Entity, Key, Loaded, Mutation, Result, Version};

/// An optimistic transaction.
///
/// Reads record the version they observed; buffered writes are committed
/// in one atomic [`Datastore::commit`] that expects every written entity to
/// still be at the version read. Writing an entity that was never read is
/// a blind write. A stale read fails the commit with `ConcurrencyConflict`,
/// and the caller retries the whole transaction with fresh state.
pub struct Transaction<'a, S: Datastore + ?Sized> {
    store: &'a S,
    reads: HashMap<Key, Version>,
    writes: BTreeMap<Key, serde_json::Value>,
}

impl<'a, S: Datastore + ?Sized> Transaction<'a, S> {
    /// Creates an empty transaction.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Reads a typed entity and records its version.
    ///
    /// An absent entity is recorded at `Version::initial()`, so a concurrent
    /// creation is detected at commit.
    pub async fn get<T: Entity>(&mut self, key: &Key) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(stored) => {
                let loaded = Loaded::<T>::from_stored(stored)?;
                self.reads.insert(key.clone(), loaded.version);
                Ok(Some(loaded.entity))
            }
            None => {
                self.reads.insert(key.clone(), Version::initial());
                Ok(None)
            }
        }
    }

    /// Buffers a write of a typed entity.
    pub fn put<T: Entity>(&mut self, key: Key, entity: &T) -> Result<()> {
        let properties = serde_json::to_value(entity)?;
        self.writes.insert(key, properties);
        Ok(())
    }

    /// Returns the number of buffered writes.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Commits the buffered writes atomically.
    ///
    /// A transaction without writes commits trivially.
    pub async fn commit(self) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }

        let mutations = self
            .writes
            .into_iter()
            .map(|(key, properties)| {
                let expected = self.reads.get(&key).copied();
                let mutation = Mutation::put(key, properties);
                match expected {
                    Some(version) => mutation.expect_version(version),
                    None => mutation,
                }
            })
            .collect();

        self.store.commit(mutations).await?;
        Ok(())
    }
}
