use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{DatastoreError, Key, Result};

/// Version number of a stored entity, used for optimistic concurrency control.
///
/// An absent entity is at version 0; the first write produces version 1 and
/// every subsequent write increments by 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version (0) of an entity that doesn't exist yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) after the first write.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed entity persisted in the datastore.
///
/// The serialized field names are the property names queries filter and
/// sort on.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// The kind every key of this entity ends with.
    const KIND: &'static str;
}

/// An entity as held by the store: key, version and JSON properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub key: Key,
    pub version: Version,
    pub properties: serde_json::Value,
}

impl StoredEntity {
    /// Returns a top-level property by name.
    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    /// Decodes the properties into a typed entity, checking the key kind.
    pub fn decode<T: Entity>(&self) -> Result<T> {
        if self.key.kind() != T::KIND {
            return Err(DatastoreError::KindMismatch {
                key: self.key.clone(),
                expected: T::KIND,
            });
        }
        Ok(serde_json::from_value(self.properties.clone())?)
    }
}

/// A typed entity together with the key and version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub key: Key,
    pub version: Version,
    pub entity: T,
}

impl<T: Entity> Loaded<T> {
    /// Decodes a stored entity.
    pub fn from_stored(stored: StoredEntity) -> Result<Self> {
        let entity = stored.decode::<T>()?;
        Ok(Self {
            key: stored.key,
            version: stored.version,
            entity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl Entity for Note {
        const KIND: &'static str = "Note";
    }

    #[test]
    fn version_ordering() {
        assert!(Version::initial() < Version::first());
        assert_eq!(Version::initial().next(), Version::first());
        assert_eq!(Version::new(4).as_i64(), 4);
    }

    #[test]
    fn decode_checks_kind() {
        let stored = StoredEntity {
            key: Key::with_id("Other", 1),
            version: Version::first(),
            properties: serde_json::json!({"text": "hi"}),
        };
        assert!(matches!(
            stored.decode::<Note>(),
            Err(DatastoreError::KindMismatch { .. })
        ));

        let stored = StoredEntity {
            key: Key::with_id("Note", 1),
            ..stored
        };
        let loaded = Loaded::<Note>::from_stored(stored).unwrap();
        assert_eq!(loaded.entity.text, "hi");
        assert_eq!(loaded.version, Version::first());
    }
}
