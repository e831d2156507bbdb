//! Persisted entities and their key hierarchy.
//!
//! `Profile(uid)` owns `Profile(uid)/Conference(id)`, which owns
//! `.../Conference(id)/Session(id)`. Speakers are a separate root
//! collection keyed by normalized name.

mod conference;
mod profile;
mod session;
mod speaker;

pub use conference::{Conference, DEFAULT_CITY, DEFAULT_MAX_ATTENDEES, DEFAULT_TOPICS};
pub use profile::{Profile, TeeShirtSize};
pub use session::{CUTOFF_HOUR, Session, Schedule};
pub use speaker::Speaker;

use datastore::{Entity, Key};

use crate::error::DomainError;

/// Decodes a caller-supplied websafe key that must name an entity of kind `T`.
///
/// Malformed keys and keys of another kind cannot resolve, so both are
/// reported as `NotFound`.
pub fn parse_key<T: Entity>(websafe: &str) -> Result<Key, DomainError> {
    let not_found = || DomainError::NotFound(format!("No {} found with key: {websafe}", T::KIND.to_lowercase()));
    let key = Key::from_websafe(websafe).map_err(|_| not_found())?;
    if key.kind() != T::KIND {
        return Err(not_found());
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_rejects_garbage_and_wrong_kind() {
        assert!(matches!(
            parse_key::<Conference>("%%%"),
            Err(DomainError::NotFound(_))
        ));

        let profile = Key::named("Profile", "u");
        assert!(matches!(
            parse_key::<Conference>(&profile.websafe()),
            Err(DomainError::NotFound(_))
        ));

        let conference = profile.child_id("Conference", 1);
        assert_eq!(parse_key::<Conference>(&conference.websafe()).unwrap(), conference);
    }
}
