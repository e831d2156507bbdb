use datastore::{Datastore, DatastoreExt};

use super::get_or_create_profile;
use crate::booking::{BookingEngine, load_profile};
use crate::error::DomainError;
use crate::forms::{BooleanMessage, ProfileForm, ProfileMiniForm};
use crate::identity::{IdentityProvider, require_user};
use crate::retry::{TransactionPolicy, run_transaction};

/// Profile and interested-topic operations.
pub struct ProfileService<S> {
    store: S,
    engine: BookingEngine<S>,
    policy: TransactionPolicy,
}

impl<S: Datastore + Clone> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: BookingEngine::new(store.clone()),
            store,
            policy: TransactionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the caller's profile, creating it on first access.
    #[tracing::instrument(skip(self, identity))]
    pub async fn get_profile(&self, identity: &dyn IdentityProvider) -> Result<ProfileForm, DomainError> {
        let user = require_user(identity)?;
        let profile = get_or_create_profile(&self.store, &self.policy, &user).await?;
        Ok(ProfileForm::from(&profile))
    }

    /// Updates the editable profile fields. Empty values are ignored.
    #[tracing::instrument(skip(self, identity))]
    pub async fn save_profile(
        &self,
        identity: &dyn IdentityProvider,
        form: ProfileMiniForm,
    ) -> Result<ProfileForm, DomainError> {
        let user = require_user(identity)?;
        let profile = run_transaction(&self.policy, "save_profile", || async {
            let mut txn = self.store.transaction();
            let (key, mut profile) = load_profile(&mut txn, &user).await?;
            form.apply(&mut profile);
            txn.put(key, &profile)?;
            txn.commit().await?;
            Ok(profile)
        })
        .await?;

        tracing::info!(user = %user.user_id, "profile saved");
        Ok(ProfileForm::from(&profile))
    }

    #[tracing::instrument(skip(self, identity))]
    pub async fn add_interested_topic(
        &self,
        identity: &dyn IdentityProvider,
        topic: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DomainError::Validation("'interestedTopic' field required".into()));
        }
        run_transaction(&self.policy, "add_interested_topic", || {
            self.engine.add_interested_topic(&user, topic)
        })
        .await
        .map(BooleanMessage::from)
    }

    #[tracing::instrument(skip(self, identity))]
    pub async fn remove_interested_topic(
        &self,
        identity: &dyn IdentityProvider,
        topic: &str,
    ) -> Result<BooleanMessage, DomainError> {
        let user = require_user(identity)?;
        let topic = topic.trim();
        run_transaction(&self.policy, "remove_interested_topic", || {
            self.engine.remove_interested_topic(&user, topic)
        })
        .await
        .map(BooleanMessage::from)
    }
}
