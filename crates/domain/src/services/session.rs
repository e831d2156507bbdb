use chrono::{NaiveDateTime, Utc};
use datastore::{Datastore, DatastoreExt, Entity, EntityQuery, FilterOp, Key};

use super::{dispatch, get_or_create_profile, session_forms};
use crate::booking::BookingEngine;
use crate::error::DomainError;
use crate::forms::{BooleanMessage, SessionForm, SessionForms};
use crate::identity::{IdentityProvider, require_user};
use crate::model::{Conference, Session, Speaker, parse_key};
use crate::retry::{TransactionPolicy, run_transaction};
use crate::tasks::{Task, TaskQueue};

const WORKSHOP: &str = "workshop";

/// Session creation, listing and wishlists.
pub struct SessionService<S, Q> {
    store: S,
    tasks: Q,
    engine: BookingEngine<S>,
    policy: TransactionPolicy,
}

impl<S: Datastore + Clone, Q: TaskQueue> SessionService<S, Q> {
    pub fn new(store: S, tasks: Q) -> Self {
        Self {
            engine: BookingEngine::new(store.clone()),
            store,
            tasks,
            policy: TransactionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a session in a conference the caller organizes.
    ///
    /// A named speaker is looked up or created in the same transaction that
    /// stores the session, then a featured-speaker recompute is enqueued.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_session(
        &self,
        identity: &dyn IdentityProvider,
        websafe_conference_key: &str,
        form: SessionForm,
    ) -> Result<SessionForm, DomainError> {
        let user = require_user(identity)?;
        let conference_key = parse_key::<Conference>(websafe_conference_key)?;
        let conference = self
            .store
            .get_entity::<Conference>(&conference_key)
            .await?
            .ok_or_else(|| conference_not_found(websafe_conference_key))?;
        if conference.entity.organizer_user_id != user.user_id {
            return Err(DomainError::Forbidden(
                "Only the conference organizer can add sessions.".into(),
            ));
        }

        let mut session = form.to_session()?;
        let key = self
            .store
            .allocate_id(Some(&conference_key), Session::KIND)
            .await?;

        match session.speaker.as_deref().and_then(Speaker::key_for) {
            Some(speaker_key) => {
                session.speaker_key = Some(speaker_key.clone());
                run_transaction(&self.policy, "create_session", || {
                    self.store_with_speaker(&key, &session, &speaker_key)
                })
                .await?;
                dispatch(&self.tasks, Task::set_featured_speaker(&speaker_key));
            }
            None => {
                self.store.put_entity(&key, &session).await?;
            }
        }

        tracing::info!(%key, name = %session.name, "session created");
        Ok(SessionForm::from_entity(&session, &key))
    }

    async fn store_with_speaker(
        &self,
        key: &Key,
        session: &Session,
        speaker_key: &Key,
    ) -> Result<(), DomainError> {
        let mut txn = self.store.transaction();
        let mut speaker = match txn.get::<Speaker>(speaker_key).await? {
            Some(speaker) => speaker,
            None => Speaker::new(session.speaker.as_deref().unwrap_or_default()),
        };
        speaker.add_session(&session.name, key);
        txn.put(speaker_key.clone(), &speaker)?;
        txn.put(key.clone(), session)?;
        txn.commit().await?;
        Ok(())
    }

    /// Lists the sessions of a conference.
    #[tracing::instrument(skip(self))]
    pub async fn conference_sessions(
        &self,
        websafe_conference_key: &str,
    ) -> Result<SessionForms, DomainError> {
        let query = self.conference_query(websafe_conference_key).await?;
        let sessions = self.store.query_entities::<Session>(query).await?;
        Ok(session_forms(&sessions))
    }

    /// Lists the sessions of a conference with the given type.
    ///
    /// Types match case-insensitively, as in
    /// [`SessionService::non_workshop_sessions_before_seven`].
    #[tracing::instrument(skip(self))]
    pub async fn conference_sessions_by_type(
        &self,
        websafe_conference_key: &str,
        type_of_session: &str,
    ) -> Result<SessionForms, DomainError> {
        let query = self.conference_query(websafe_conference_key).await?;
        let mut sessions = self.store.query_entities::<Session>(query).await?;
        sessions.retain(|s| s.entity.is_type(type_of_session.trim()));
        Ok(session_forms(&sessions))
    }

    /// Lists every session of a speaker, across conferences.
    #[tracing::instrument(skip(self))]
    pub async fn sessions_by_speaker(&self, speaker: &str) -> Result<SessionForms, DomainError> {
        let Some(speaker_key) = Speaker::key_for(speaker) else {
            return Ok(SessionForms::default());
        };
        let Some(speaker) = self.store.get_entity::<Speaker>(&speaker_key).await? else {
            return Ok(SessionForms::default());
        };
        let sessions = self
            .store
            .get_entities::<Session>(&speaker.entity.session_keys)
            .await?;
        Ok(session_forms(&sessions))
    }

    #[tracing::instrument(skip(self, identity))]
    pub async fn add_to_wishlist(
        &self,
        identity: &dyn IdentityProvider,
        websafe_session_key: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let key = parse_key::<Session>(websafe_session_key)?;
        run_transaction(&self.policy, "add_to_wishlist", || {
            self.engine.add_to_wishlist(&user, &key)
        })
        .await
        .map(BooleanMessage::from)
    }

    /// Removes a session from the wishlist. A key that was never added,
    /// malformed or not, yields false.
    #[tracing::instrument(skip(self, identity))]
    pub async fn remove_from_wishlist(
        &self,
        identity: &dyn IdentityProvider,
        websafe_session_key: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let Ok(key) = Key::from_websafe(websafe_session_key) else {
            return Ok(false.into());
        };
        run_transaction(&self.policy, "remove_from_wishlist", || {
            self.engine.remove_from_wishlist(&user, &key)
        })
        .await
        .map(BooleanMessage::from)
    }

    /// Lists the sessions in the caller's wishlist, skipping deleted ones.
    #[tracing::instrument(skip(self, identity))]
    pub async fn wishlist(&self, identity: &dyn IdentityProvider) -> Result<SessionForms, DomainError> {
        let user = require_user(identity)?;
        let profile = get_or_create_profile(&self.store, &self.policy, &user).await?;
        let sessions = self
            .store
            .get_entities::<Session>(&profile.sessions_in_wishlist)
            .await?;
        Ok(session_forms(&sessions))
    }

    /// Lists sessions that have ended.
    pub async fn finished_sessions(&self) -> Result<SessionForms, DomainError> {
        self.finished_sessions_at(Utc::now().naive_utc()).await
    }

    /// Lists sessions ending strictly before `now`, earliest first.
    #[tracing::instrument(skip(self))]
    pub async fn finished_sessions_at(&self, now: NaiveDateTime) -> Result<SessionForms, DomainError> {
        let query = EntityQuery::for_entity::<Session>()
            .filter("endDateTime", FilterOp::LessThan, serde_json::to_value(now)?)
            .order("endDateTime");
        let sessions = self.store.query_entities::<Session>(query).await?;
        Ok(session_forms(&sessions))
    }

    /// Lists sessions that finish before seven and are not workshops.
    ///
    /// The datastore allows only one inequality per query, so the type is
    /// filtered after the scan; sessions without a type are kept.
    #[tracing::instrument(skip(self))]
    pub async fn non_workshop_sessions_before_seven(&self) -> Result<SessionForms, DomainError> {
        let query =
            EntityQuery::for_entity::<Session>().filter("finishBeforeSeven", FilterOp::Equal, true);
        let mut sessions = self.store.query_entities::<Session>(query).await?;
        sessions.retain(|s| !s.entity.is_type(WORKSHOP));
        Ok(session_forms(&sessions))
    }

    async fn conference_query(&self, websafe_conference_key: &str) -> Result<EntityQuery, DomainError> {
        let conference_key = parse_key::<Conference>(websafe_conference_key)?;
        if self.store.get(&conference_key).await?.is_none() {
            return Err(conference_not_found(websafe_conference_key));
        }
        Ok(EntityQuery::for_entity::<Session>()
            .ancestor(conference_key)
            .order("date")
            .order("startTime"))
    }
}

fn conference_not_found(websafe_key: &str) -> DomainError {
    DomainError::NotFound(format!("No conference found with key: {websafe_key}"))
}
