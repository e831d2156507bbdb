//! Hierarchical entity keys.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding a websafe key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The string is not valid URL-safe base64.
    #[error("Invalid key encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded bytes are not a key path.
    #[error("Invalid key path: {0}")]
    Path(#[from] serde_json::Error),

    /// The decoded path is empty or contains an empty kind.
    #[error("Key path must contain at least one element with a non-empty kind")]
    Empty,
}

/// The identifier part of a key element: an allocated integer or a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyId {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "{id}"),
            KeyId::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// One element of a key path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyPart {
    pub kind: String,
    pub id: KeyId,
}

/// A hierarchical key: the path from the root entity down to this entity.
///
/// The parent of `Profile("alice")/Conference(7)` is `Profile("alice")`;
/// ancestor-scoped queries match every key whose path starts with the
/// ancestor's path.
///
/// Keys serialize as their websafe string, so a stored key property
/// compares by plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    path: Vec<KeyPart>,
}

impl Key {
    /// Creates a root key identified by name.
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: vec![KeyPart {
                kind: kind.into(),
                id: KeyId::Name(name.into()),
            }],
        }
    }

    /// Creates a root key identified by an allocated integer id.
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            path: vec![KeyPart {
                kind: kind.into(),
                id: KeyId::Id(id),
            }],
        }
    }

    /// Creates a child key of `self` identified by name.
    pub fn child_named(&self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.child(KeyPart {
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        })
    }

    /// Creates a child key of `self` identified by an integer id.
    pub fn child_id(&self, kind: impl Into<String>, id: i64) -> Self {
        self.child(KeyPart {
            kind: kind.into(),
            id: KeyId::Id(id),
        })
    }

    fn child(&self, part: KeyPart) -> Self {
        let mut path = self.path.clone();
        path.push(part);
        Self { path }
    }

    /// Returns the kind of the entity this key names.
    pub fn kind(&self) -> &str {
        &self.last().kind
    }

    /// Returns the identifier of the entity this key names.
    pub fn id(&self) -> &KeyId {
        &self.last().id
    }

    /// Returns the name identifier, if this key is name-based.
    pub fn name(&self) -> Option<&str> {
        match self.id() {
            KeyId::Name(name) => Some(name),
            KeyId::Id(_) => None,
        }
    }

    /// Returns the parent key, or None for a root key.
    pub fn parent(&self) -> Option<Key> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Self {
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Returns true if `ancestor` is this key or one of its ancestors.
    pub fn has_ancestor(&self, ancestor: &Key) -> bool {
        self.path.starts_with(&ancestor.path)
    }

    /// Returns the key path.
    pub fn path(&self) -> &[KeyPart] {
        &self.path
    }

    /// Encodes the key as an opaque URL-safe string.
    pub fn websafe(&self) -> String {
        // A Vec of plain structs always serializes.
        let bytes = serde_json::to_vec(&self.path).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decodes a key produced by [`Key::websafe`].
    pub fn from_websafe(encoded: &str) -> Result<Self, KeyError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim())?;
        let path: Vec<KeyPart> = serde_json::from_slice(&bytes)?;
        if path.is_empty() || path.iter().any(|p| p.kind.is_empty()) {
            return Err(KeyError::Empty);
        }
        Ok(Self { path })
    }

    fn last(&self) -> &KeyPart {
        // Constructors never build an empty path.
        &self.path[self.path.len() - 1]
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}({})", part.kind, part.id)?;
        }
        Ok(())
    }
}

impl Serialize for Key {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.websafe())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Key::from_websafe(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_key_knows_its_parent() {
        let profile = Key::named("Profile", "alice");
        let conference = profile.child_id("Conference", 7);

        assert_eq!(conference.kind(), "Conference");
        assert_eq!(conference.id(), &KeyId::Id(7));
        assert_eq!(conference.parent(), Some(profile.clone()));
        assert!(conference.has_ancestor(&profile));
        assert!(!profile.has_ancestor(&conference));
        assert_eq!(profile.parent(), None);
    }

    #[test]
    fn websafe_decodes_to_same_key() {
        let key = Key::named("Profile", "bob/with:odd chars").child_id("Conference", 42);
        let encoded = key.websafe();

        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(Key::from_websafe(&encoded).unwrap(), key);
    }

    #[test]
    fn malformed_websafe_is_rejected() {
        assert!(matches!(
            Key::from_websafe("not base64!"),
            Err(KeyError::Encoding(_))
        ));
        let not_a_path = URL_SAFE_NO_PAD.encode(b"{\"a\":1}");
        assert!(matches!(
            Key::from_websafe(&not_a_path),
            Err(KeyError::Path(_))
        ));
        let empty = URL_SAFE_NO_PAD.encode(b"[]");
        assert!(matches!(Key::from_websafe(&empty), Err(KeyError::Empty)));
    }

    #[test]
    fn key_serializes_as_websafe_string() {
        let key = Key::named("Speaker", "ada lovelace");
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json, serde_json::Value::String(key.websafe()));
        let back: Key = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn display_renders_path() {
        let key = Key::named("Profile", "alice").child_id("Conference", 3);
        assert_eq!(key.to_string(), "Profile(\"alice\")/Conference(3)");
    }
}
