use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    DatastoreError, EntityQuery, Key, Result, StoredEntity, Version,
    store::{Datastore, EntityStream, Mutation},
};

#[derive(Default)]
struct InMemoryState {
    entities: BTreeMap<Key, StoredEntity>,
    next_ids: HashMap<String, i64>,
}

/// In-memory datastore implementation.
///
/// Entities are held in key order, so unordered queries return results in
/// key order. Commits take the write lock, which makes every commit
/// atomic across entity groups.
#[derive(Clone, Default)]
pub struct InMemoryDatastore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryDatastore {
    /// Creates a new empty in-memory datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of entities stored.
    pub async fn entity_count(&self) -> usize {
        self.state.read().await.entities.len()
    }

    /// Removes all entities.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entities.clear();
        state.next_ids.clear();
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn allocate_id(&self, parent: Option<&Key>, kind: &str) -> Result<Key> {
        let mut state = self.state.write().await;
        let next = state.next_ids.entry(kind.to_string()).or_insert(0);
        *next += 1;
        let id = *next;

        Ok(match parent {
            Some(parent) => parent.child_id(kind, id),
            None => Key::with_id(kind, id),
        })
    }

    async fn get(&self, key: &Key) -> Result<Option<StoredEntity>> {
        Ok(self.state.read().await.entities.get(key).cloned())
    }

    async fn get_multi(&self, keys: &[Key]) -> Result<Vec<Option<StoredEntity>>> {
        let state = self.state.read().await;
        Ok(keys.iter().map(|k| state.entities.get(k).cloned()).collect())
    }

    async fn commit(&self, mutations: Vec<Mutation>) -> Result<Vec<Version>> {
        let mut state = self.state.write().await;

        // Check every expected version before applying anything
        for mutation in &mutations {
            let actual = state
                .entities
                .get(&mutation.key)
                .map(|e| e.version)
                .unwrap_or(Version::initial());
            if let Some(expected) = mutation.expected_version
                && expected != actual
            {
                metrics::counter!("datastore_conflicts_total").increment(1);
                tracing::debug!(key = %mutation.key, %expected, %actual, "commit conflict");
                return Err(DatastoreError::ConcurrencyConflict {
                    key: mutation.key.clone(),
                    expected,
                    actual,
                });
            }
        }

        let mut versions = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            let version = state
                .entities
                .get(&mutation.key)
                .map(|e| e.version)
                .unwrap_or(Version::initial())
                .next();
            state.entities.insert(
                mutation.key.clone(),
                StoredEntity {
                    key: mutation.key,
                    version,
                    properties: mutation.properties,
                },
            );
            versions.push(version);
        }

        Ok(versions)
    }

    async fn query(&self, query: EntityQuery) -> Result<EntityStream> {
        use futures_util::stream;

        query.validate()?;

        let state = self.state.read().await;
        let mut results: Vec<StoredEntity> = state
            .entities
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        drop(state);

        results.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        let stream = stream::iter(results.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatastoreExt, FilterOp};
    use futures_util::TryStreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn allocate_id_under_parent() {
        let store = InMemoryDatastore::new();
        let parent = Key::named("Profile", "alice");

        let first = store.allocate_id(Some(&parent), "Conference").await.unwrap();
        let second = store.allocate_id(Some(&parent), "Conference").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(parent));
        assert_eq!(first.kind(), "Conference");
    }

    #[tokio::test]
    async fn commit_assigns_versions() {
        let store = InMemoryDatastore::new();
        let key = Key::with_id("Note", 1);

        let versions = store
            .commit(vec![Mutation::put(key.clone(), json!({"n": 1}))])
            .await
            .unwrap();
        assert_eq!(versions, vec![Version::first()]);

        let versions = store
            .commit(vec![
                Mutation::put(key.clone(), json!({"n": 2})).expect_version(Version::first()),
            ])
            .await
            .unwrap();
        assert_eq!(versions, vec![Version::new(2)]);

        let stored = store.get(&key).await.unwrap().unwrap();
        assert_eq!(stored.properties, json!({"n": 2}));
    }

    #[tokio::test]
    async fn conflicting_commit_applies_nothing() {
        let store = InMemoryDatastore::new();
        let a = Key::with_id("Note", 1);
        let b = Key::with_id("Note", 2);
        store
            .commit(vec![Mutation::put(a.clone(), json!({"n": 1}))])
            .await
            .unwrap();

        let result = store
            .commit(vec![
                Mutation::put(b.clone(), json!({"n": 1})).expect_version(Version::initial()),
                Mutation::put(a.clone(), json!({"n": 9})).expect_version(Version::initial()),
            ])
            .await;

        assert!(matches!(
            result,
            Err(DatastoreError::ConcurrencyConflict { .. })
        ));
        assert!(store.get(&b).await.unwrap().is_none());
        assert_eq!(
            store.get(&a).await.unwrap().unwrap().properties,
            json!({"n": 1})
        );
    }

    #[tokio::test]
    async fn query_scopes_by_ancestor_and_orders() {
        let store = InMemoryDatastore::new();
        let alice = Key::named("Profile", "alice");
        let bob = Key::named("Profile", "bob");

        for (parent, name, month) in [(&alice, "Zeta", 3), (&alice, "Alpha", 3), (&bob, "Beta", 1)] {
            let key = store.allocate_id(Some(parent), "Conference").await.unwrap();
            store
                .commit(vec![Mutation::put(key, json!({"name": name, "month": month}))])
                .await
                .unwrap();
        }

        let query = EntityQuery::new("Conference").ancestor(alice.clone()).order("name");
        let names: Vec<_> = store
            .query(query)
            .await
            .unwrap()
            .try_collect::<Vec<_>>()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.properties["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Alpha"), json!("Zeta")]);

        let query = EntityQuery::new("Conference")
            .filter("month", FilterOp::GreaterThan, 1)
            .order("month")
            .order("name");
        let results: Vec<StoredEntity> = store.query(query).await.unwrap().try_collect().await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn query_rejects_invalid_structure() {
        let store = InMemoryDatastore::new();
        let query = EntityQuery::new("Conference")
            .filter("month", FilterOp::GreaterThan, 1)
            .filter("city", FilterOp::NotEqual, "Paris");

        assert!(matches!(
            store.query(query).await,
            Err(DatastoreError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn ext_put_and_get_entity() {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Note {
            text: String,
        }
        impl crate::Entity for Note {
            const KIND: &'static str = "Note";
        }

        let store = InMemoryDatastore::new();
        let key = Key::named("Note", "n1");
        store
            .put_entity(&key, &Note { text: "hi".into() })
            .await
            .unwrap();

        let loaded = store.get_entity::<Note>(&key).await.unwrap().unwrap();
        assert_eq!(loaded.entity.text, "hi");
        assert_eq!(store.entity_count().await, 1);

        let missing = store
            .get_entities::<Note>(&[key.clone(), Key::named("Note", "n2")])
            .await
            .unwrap();
        assert_eq!(missing.len(), 1);
    }
}
