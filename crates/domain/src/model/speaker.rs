use datastore::{Entity, Key};
use serde::{Deserialize, Serialize};

/// A speaker, shared by every session naming them.
///
/// Keyed by normalized name, so two sessions naming "Ada  Lovelace" and
/// "ada lovelace" share one speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    /// The first spelling seen, trimmed.
    pub name: String,
    /// Names of the speaker's sessions, in creation order.
    #[serde(default)]
    pub sessions: Vec<String>,
    /// Keys of the speaker's sessions, parallel to `sessions`.
    #[serde(default)]
    pub session_keys: Vec<Key>,
}

impl Entity for Speaker {
    const KIND: &'static str = "Speaker";
}

impl Speaker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            sessions: Vec::new(),
            session_keys: Vec::new(),
        }
    }

    /// Trims, collapses internal whitespace and case-folds a speaker name.
    pub fn normalize(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Returns the key of the speaker called `name`, or None for a blank name.
    pub fn key_for(name: &str) -> Option<Key> {
        let normalized = Self::normalize(name);
        (!normalized.is_empty()).then(|| Key::named(Self::KIND, normalized))
    }

    /// Records a session, ignoring one already recorded.
    pub fn add_session(&mut self, name: &str, key: &Key) {
        if !self.session_keys.contains(key) {
            self.sessions.push(name.to_string());
            self.session_keys.push(key.clone());
        }
    }

    pub fn is_featured(&self) -> bool {
        self.sessions.len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_normalize_to_one_key() {
        assert_eq!(
            Speaker::key_for("  Ada   Lovelace "),
            Speaker::key_for("ada lovelace")
        );
        assert_eq!(Speaker::key_for("   "), None);
        assert_eq!(Speaker::new("  Ada Lovelace ").name, "Ada Lovelace");
    }

    #[test]
    fn add_session_is_idempotent_per_key() {
        let mut speaker = Speaker::new("Ada");
        let key = Key::with_id("Session", 1);
        speaker.add_session("Intro", &key);
        speaker.add_session("Intro", &key);
        assert_eq!(speaker.sessions, vec!["Intro"]);
        assert!(!speaker.is_featured());

        speaker.add_session("Advanced", &Key::with_id("Session", 2));
        assert!(speaker.is_featured());
    }
}
