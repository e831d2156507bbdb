//! Shared application state.

use std::sync::Arc;

use datastore::InMemoryDatastore;
use domain::{ConferenceService, ProfileService, SessionService, Task, TransactionPolicy};
use projections::{CacheManager, ChannelTaskQueue, InMemoryCache};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub conferences: ConferenceService<InMemoryDatastore, ChannelTaskQueue>,
    pub profiles: ProfileService<InMemoryDatastore>,
    pub sessions: SessionService<InMemoryDatastore, ChannelTaskQueue>,
    pub caches: Arc<CacheManager<InMemoryCache>>,
}

impl AppState {
    /// Wires the services to `store`, returning the receiving end of their
    /// task queue.
    pub fn new(store: InMemoryDatastore, config: &Config) -> (Arc<Self>, UnboundedReceiver<Task>) {
        let policy = TransactionPolicy::with_attempts(config.transaction_attempts);
        let (tasks, receiver) = projections::channel();
        let caches = Arc::new(CacheManager::with_defaults(
            store.clone(),
            InMemoryCache::new(),
        ));

        let state = Arc::new(Self {
            conferences: ConferenceService::new(store.clone(), tasks.clone())
                .with_policy(policy),
            profiles: ProfileService::new(store.clone()).with_policy(policy),
            sessions: SessionService::new(store, tasks).with_policy(policy),
            caches,
        });
        (state, receiver)
    }
}
