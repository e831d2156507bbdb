pub mod entity;
pub mod error;
pub mod memory;
pub mod query;
pub mod store;
pub mod transaction;

pub use common::{Key, KeyId};
pub use entity::{Entity, Loaded, StoredEntity, Version};
pub use error::{DatastoreError, Result};
pub use memory::InMemoryDatastore;
pub use query::{EntityQuery, FilterOp, PropertyFilter, SortDirection, SortOrder};
pub use store::{Datastore, DatastoreExt, EntityStream, Mutation};
pub use transaction::Transaction;
