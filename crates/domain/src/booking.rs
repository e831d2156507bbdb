//! Seat booking and per-user interest lists.
//!
//! Each engine call is one optimistic transaction attempt: it reads fresh
//! state, applies a transition and commits. Conflicts surface as retryable
//! errors for the caller to re-run (see [`crate::retry`]). Adds are strict
//! (a duplicate is a `Conflict`); removes of absent entries return false.

use datastore::{Datastore, DatastoreExt, Key, Transaction};

use crate::error::DomainError;
use crate::identity::CurrentUser;
use crate::model::{Conference, Profile, Session};

/// Appends `item` unless present.
pub fn add_unique<T: PartialEq>(list: &mut Vec<T>, item: T, duplicate: &str) -> Result<(), DomainError> {
    if list.contains(&item) {
        return Err(DomainError::Conflict(duplicate.to_string()));
    }
    list.push(item);
    Ok(())
}

/// Removes `item` if present. Returns whether it was.
pub fn remove_present<T: PartialEq>(list: &mut Vec<T>, item: &T) -> bool {
    match list.iter().position(|e| e == item) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

/// Books one seat of `conference` for `profile`.
pub fn reserve_seat(profile: &mut Profile, conference: &mut Conference, key: &Key) -> Result<(), DomainError> {
    if profile.is_attending(key) {
        return Err(DomainError::Conflict(
            "You have already registered for this conference".into(),
        ));
    }
    if conference.seats_available <= 0 {
        return Err(DomainError::Conflict("There are no seats available.".into()));
    }
    profile.conference_keys_to_attend.push(key.clone());
    conference.seats_available -= 1;
    Ok(())
}

/// Gives back the seat `profile` holds, if any.
pub fn release_seat(profile: &mut Profile, conference: &mut Conference, key: &Key) -> bool {
    if !remove_present(&mut profile.conference_keys_to_attend, key) {
        return false;
    }
    conference.seats_available = (conference.seats_available + 1).min(conference.max_attendees);
    true
}

/// Runs booking and interest transitions against a datastore.
#[derive(Clone)]
pub struct BookingEngine<S> {
    store: S,
}

impl<S: Datastore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers the user for a conference, atomically with the seat decrement.
    pub async fn register(&self, user: &CurrentUser, conference_key: &Key) -> Result<bool, DomainError> {
        let mut txn = self.store.transaction();
        let (profile_key, mut profile) = load_profile(&mut txn, user).await?;
        let mut conference = load_conference(&mut txn, conference_key).await?;

        reserve_seat(&mut profile, &mut conference, conference_key)?;

        txn.put(profile_key, &profile)?;
        txn.put(conference_key.clone(), &conference)?;
        txn.commit().await?;
        Ok(true)
    }

    /// Unregisters the user, returning false when they weren't registered.
    pub async fn unregister(&self, user: &CurrentUser, conference_key: &Key) -> Result<bool, DomainError> {
        let mut txn = self.store.transaction();
        let (profile_key, mut profile) = load_profile(&mut txn, user).await?;
        let mut conference = load_conference(&mut txn, conference_key).await?;

        if !release_seat(&mut profile, &mut conference, conference_key) {
            return Ok(false);
        }

        txn.put(profile_key, &profile)?;
        txn.put(conference_key.clone(), &conference)?;
        txn.commit().await?;
        Ok(true)
    }

    pub async fn add_interested_topic(&self, user: &CurrentUser, topic: &str) -> Result<bool, DomainError> {
        self.update_profile(user, |profile| {
            add_unique(
                &mut profile.interested_topics,
                topic.to_string(),
                "You have already added this topic",
            )?;
            Ok(true)
        })
        .await
    }

    pub async fn remove_interested_topic(&self, user: &CurrentUser, topic: &str) -> Result<bool, DomainError> {
        self.update_profile(user, |profile| {
            Ok(remove_present(&mut profile.interested_topics, &topic.to_string()))
        })
        .await
    }

    /// Adds a session to the wishlist. The session must exist.
    pub async fn add_to_wishlist(&self, user: &CurrentUser, session_key: &Key) -> Result<bool, DomainError> {
        if !session_exists(&self.store, session_key).await? {
            return Err(DomainError::NotFound(format!(
                "No session found with key: {}",
                session_key.websafe()
            )));
        }
        self.update_profile(user, |profile| {
            add_unique(
                &mut profile.sessions_in_wishlist,
                session_key.clone(),
                "This session is already in your wishlist",
            )?;
            Ok(true)
        })
        .await
    }

    pub async fn remove_from_wishlist(&self, user: &CurrentUser, session_key: &Key) -> Result<bool, DomainError> {
        self.update_profile(user, |profile| {
            Ok(remove_present(&mut profile.sessions_in_wishlist, session_key))
        })
        .await
    }

    // Single-entity transaction: the write happens only when `change` returns true.
    async fn update_profile<F>(&self, user: &CurrentUser, change: F) -> Result<bool, DomainError>
    where
        F: FnOnce(&mut Profile) -> Result<bool, DomainError>,
    {
        let mut txn = self.store.transaction();
        let (profile_key, mut profile) = load_profile(&mut txn, user).await?;
        if !change(&mut profile)? {
            return Ok(false);
        }
        txn.put(profile_key, &profile)?;
        txn.commit().await?;
        Ok(true)
    }
}

/// Reads the user's profile inside a transaction, starting from the
/// default profile when none is stored yet.
pub async fn load_profile<S: Datastore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    user: &CurrentUser,
) -> Result<(Key, Profile), DomainError> {
    let key = Profile::key(&user.user_id);
    let profile = match txn.get::<Profile>(&key).await? {
        Some(profile) => profile,
        None => Profile::for_user(user),
    };
    Ok((key, profile))
}

async fn load_conference<S: Datastore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    key: &Key,
) -> Result<Conference, DomainError> {
    txn.get::<Conference>(key).await?.ok_or_else(|| {
        DomainError::NotFound(format!("No conference found with key: {}", key.websafe()))
    })
}

/// Returns true if `key` resolves to a stored session.
pub async fn session_exists<S: Datastore + ?Sized>(store: &S, key: &Key) -> Result<bool, DomainError> {
    Ok(store.get_entity::<Session>(key).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;

    fn conference(max: i64, seats: i64) -> Conference {
        Conference {
            name: "RustConf".into(),
            description: None,
            topics: vec![],
            city: None,
            start_date: None,
            end_date: None,
            month: 0,
            max_attendees: max,
            seats_available: seats,
            organizer_user_id: UserId::new("org"),
        }
    }

    fn profile() -> Profile {
        Profile::for_user(&CurrentUser::new("u", "u@example.com", "u"))
    }

    fn key() -> Key {
        Key::named("Profile", "org").child_id("Conference", 1)
    }

    #[test]
    fn reserve_and_release_round_trip() {
        let (mut profile, mut conference) = (profile(), conference(5, 5));

        reserve_seat(&mut profile, &mut conference, &key()).unwrap();
        assert_eq!(conference.seats_available, 4);
        assert!(profile.is_attending(&key()));

        assert!(release_seat(&mut profile, &mut conference, &key()));
        assert_eq!(conference.seats_available, 5);
        assert!(!profile.is_attending(&key()));

        assert!(!release_seat(&mut profile, &mut conference, &key()));
        assert_eq!(conference.seats_available, 5);
    }

    #[test]
    fn full_conference_rejects_without_mutation() {
        let (mut profile, mut conference) = (profile(), conference(3, 0));
        let before = (profile.clone(), conference.clone());

        assert!(matches!(
            reserve_seat(&mut profile, &mut conference, &key()),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!((profile, conference), before);
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let (mut profile, mut conference) = (profile(), conference(3, 3));
        reserve_seat(&mut profile, &mut conference, &key()).unwrap();
        assert!(matches!(
            reserve_seat(&mut profile, &mut conference, &key()),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(conference.seats_available, 2);
    }

    #[test]
    fn strict_add_lenient_remove() {
        let mut topics = vec!["Rust".to_string()];
        assert!(add_unique(&mut topics, "Rust".to_string(), "dup").is_err());
        add_unique(&mut topics, "Go".to_string(), "dup").unwrap();
        assert!(remove_present(&mut topics, &"Go".to_string()));
        assert!(!remove_present(&mut topics, &"Go".to_string()));
        assert_eq!(topics, vec!["Rust"]);
    }
}
