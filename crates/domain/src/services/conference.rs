use datastore::{Datastore, DatastoreExt, Entity, EntityQuery, FilterOp, Key};
use serde_json::Value;

use super::{conference_forms, dispatch, get_or_create_profile};
use crate::booking::BookingEngine;
use crate::error::DomainError;
use crate::filter;
use crate::forms::{BooleanMessage, ConferenceForm, ConferenceForms, ConferenceQueryForms};
use crate::identity::{IdentityProvider, require_user};
use crate::model::{Conference, Profile, parse_key};
use crate::retry::{TransactionPolicy, run_transaction};
use crate::tasks::{Task, TaskQueue};

/// Conference lifecycle, search and registration.
///
/// Mutations that can change the set of nearly sold out conferences
/// enqueue an announcement recompute.
pub struct ConferenceService<S, Q> {
    store: S,
    tasks: Q,
    engine: BookingEngine<S>,
    policy: TransactionPolicy,
}

impl<S: Datastore + Clone, Q: TaskQueue> ConferenceService<S, Q> {
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

    /// Returns a reference to the underlying datastore.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a conference organized by the caller.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_conference(
        &self,
        identity: &dyn IdentityProvider,
        form: ConferenceForm,
    ) -> Result<ConferenceForm, DomainError> {
        let user = require_user(identity)?;
        let conference = form.to_new_conference(&user.user_id)?;
        let organizer = get_or_create_profile(&self.store, &self.policy, &user).await?;

        let key = self
            .store
            .allocate_id(Some(&Profile::key(&user.user_id)), Conference::KIND)
            .await?;
        let created = ConferenceForm::from_entity(&conference, &key, Some(&organizer.display_name));
        let confirmation = Task::send_confirmation_email(&user.email, serde_json::to_string(&created)?);
        self.store.put_entity(&key, &conference).await?;

        dispatch(&self.tasks, confirmation);
        dispatch(&self.tasks, Task::set_announcement());

        tracing::info!(%key, name = %conference.name, "conference created");
        Ok(created)
    }

    /// Updates a conference. Only its organizer may do so.
    #[tracing::instrument(skip(self, identity))]
    pub async fn update_conference(
        &self,
        identity: &dyn IdentityProvider,
        websafe_key: &str,
        form: ConferenceForm,
    ) -> Result<ConferenceForm, DomainError> {
        let user = require_user(identity)?;
        let key = parse_key::<Conference>(websafe_key)?;

        let conference = run_transaction(&self.policy, "update_conference", || async {
            let mut txn = self.store.transaction();
            let mut conference = txn
                .get::<Conference>(&key)
                .await?
                .ok_or_else(|| not_found(websafe_key))?;
            if conference.organizer_user_id != user.user_id {
                return Err(DomainError::Forbidden(
                    "Only the owner can update the conference.".into(),
                ));
            }
            form.apply_update(&mut conference)?;
            txn.put(key.clone(), &conference)?;
            txn.commit().await?;
            Ok(conference)
        })
        .await?;

        dispatch(&self.tasks, Task::set_announcement());

        let organizer = self
            .store
            .get_entity::<Profile>(&Profile::key(&user.user_id))
            .await?
            .map(|p| p.entity.display_name);
        tracing::info!(%key, "conference updated");
        Ok(ConferenceForm::from_entity(&conference, &key, organizer.as_deref()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_conference(&self, websafe_key: &str) -> Result<ConferenceForm, DomainError> {
        let key = parse_key::<Conference>(websafe_key)?;
        let conference = self
            .store
            .get_entity::<Conference>(&key)
            .await?
            .ok_or_else(|| not_found(websafe_key))?;

        let mut forms = conference_forms(&self.store, std::slice::from_ref(&conference)).await?;
        forms.items.pop().ok_or_else(|| not_found(websafe_key))
    }

    /// Lists the conferences the caller organizes, by name.
    #[tracing::instrument(skip(self, identity))]
    pub async fn conferences_created(
        &self,
        identity: &dyn IdentityProvider,
    ) -> Result<ConferenceForms, DomainError> {
        let user = require_user(identity)?;
        let query = EntityQuery::for_entity::<Conference>()
            .ancestor(Profile::key(&user.user_id))
            .order("name");
        let conferences = self.store.query_entities::<Conference>(query).await?;
        conference_forms(&self.store, &conferences).await
    }

    /// Searches conferences with user-supplied filters.
    #[tracing::instrument(skip(self))]
    pub async fn query_conferences(
        &self,
        forms: &ConferenceQueryForms,
    ) -> Result<ConferenceForms, DomainError> {
        let query = filter::compile(&forms.filters)?;
        let conferences = self.store.query_entities::<Conference>(query).await?;
        conference_forms(&self.store, &conferences).await
    }

    /// Lists conferences sharing a topic with the caller's interests.
    #[tracing::instrument(skip(self, identity))]
    pub async fn conferences_with_interested_topics(
        &self,
        identity: &dyn IdentityProvider,
    ) -> Result<ConferenceForms, DomainError> {
        let user = require_user(identity)?;
        let profile = get_or_create_profile(&self.store, &self.policy, &user).await?;
        if profile.interested_topics.is_empty() {
            return Ok(ConferenceForms::default());
        }

        let topics: Vec<Value> = profile.interested_topics.into_iter().map(Value::from).collect();
        let query = EntityQuery::for_entity::<Conference>()
            .filter("topics", FilterOp::In, topics)
            .order("name");
        let conferences = self.store.query_entities::<Conference>(query).await?;
        conference_forms(&self.store, &conferences).await
    }

    /// Registers the caller for a conference.
    #[tracing::instrument(skip(self, identity))]
    pub async fn register(
        &self,
        identity: &dyn IdentityProvider,
        websafe_key: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let key = parse_key::<Conference>(websafe_key)?;

        let registered = run_transaction(&self.policy, "register", || {
            self.engine.register(&user, &key)
        })
        .await?;

        self.after_registration_change(&key, "register");
        Ok(registered.into())
    }

    /// Unregisters the caller. Returns false if they weren't registered.
    #[tracing::instrument(skip(self, identity))]
    pub async fn unregister(
        &self,
        identity: &dyn IdentityProvider,
        websafe_key: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let key = parse_key::<Conference>(websafe_key)?;

        let unregistered = run_transaction(&self.policy, "unregister", || {
            self.engine.unregister(&user, &key)
        })
        .await?;

        if unregistered {
            self.after_registration_change(&key, "unregister");
        }
        Ok(unregistered.into())
    }

    /// Lists the conferences the caller is registered for.
    #[tracing::instrument(skip(self, identity))]
    pub async fn conferences_to_attend(
        &self,
        identity: &dyn IdentityProvider,
    ) -> Result<ConferenceForms, DomainError> {
        let user = require_user(identity)?;
        let profile = get_or_create_profile(&self.store, &self.policy, &user).await?;
        let conferences = self
            .store
            .get_entities::<Conference>(&profile.conference_keys_to_attend)
            .await?;
        conference_forms(&self.store, &conferences).await
    }

    fn after_registration_change(&self, key: &Key, action: &'static str) {
        metrics::counter!("registrations_total", "action" => action).increment(1);
        tracing::info!(%key, action, "registration changed");
        dispatch(&self.tasks, Task::set_announcement());
    }
}

fn not_found(websafe_key: &str) -> DomainError {
    DomainError::NotFound(format!("No conference found with key: {websafe_key}"))
}
