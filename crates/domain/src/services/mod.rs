//! Services implementing the exposed operations.
//!
//! Every service wraps engine calls in [`run_transaction`] so optimistic
//! conflicts are retried with fresh state.

mod conference;
mod profile;
mod session;

pub use conference::ConferenceService;
pub use profile::ProfileService;
pub use session::SessionService;

use std::collections::HashMap;

use datastore::{Datastore, DatastoreExt, Key, Loaded};

use crate::booking::load_profile;
use crate::error::DomainError;
use crate::forms::{ConferenceForm, ConferenceForms, SessionForm, SessionForms};
use crate::identity::CurrentUser;
use crate::model::{Conference, Profile, Session};
use crate::retry::{TransactionPolicy, run_transaction};
use crate::tasks::{Task, TaskQueue};

/// Returns the user's profile, storing the default one on first access.
pub(crate) async fn get_or_create_profile<S: Datastore>(
    store: &S,
    policy: &TransactionPolicy,
    user: &CurrentUser,
) -> Result<Profile, DomainError> {
    let key = Profile::key(&user.user_id);
    if let Some(existing) = store.get_entity::<Profile>(&key).await? {
        return Ok(existing.entity);
    }

    run_transaction(policy, "create_profile", || async {
        let mut txn = store.transaction();
        let (key, profile) = load_profile(&mut txn, user).await?;
        txn.put(key, &profile)?;
        txn.commit().await?;
        Ok(profile)
    })
    .await
}

/// Hands a task to the queue and counts it.
///
/// Runs after the triggering mutation has committed, so a refused task is
/// logged and counted but never fails the caller.
pub(crate) fn dispatch<Q: TaskQueue + ?Sized>(queue: &Q, task: Task) {
    let procedure = task.procedure.clone();
    match queue.enqueue(task) {
        Ok(()) => {
            metrics::counter!("tasks_enqueued_total", "procedure" => procedure.clone()).increment(1);
            tracing::debug!(%procedure, "task enqueued");
        }
        Err(e) => {
            metrics::counter!("tasks_enqueue_failed_total", "procedure" => procedure.clone())
                .increment(1);
            tracing::error!(%procedure, error = %e, "failed to enqueue task");
        }
    }
}

/// Renders conferences with their organizers' display names.
pub(crate) async fn conference_forms<S: Datastore>(
    store: &S,
    conferences: &[Loaded<Conference>],
) -> Result<ConferenceForms, DomainError> {
    let mut organizers: Vec<Key> = conferences.iter().filter_map(|c| c.key.parent()).collect();
    organizers.sort();
    organizers.dedup();

    let names: HashMap<Key, String> = store
        .get_entities::<Profile>(&organizers)
        .await?
        .into_iter()
        .map(|p| (p.key, p.entity.display_name))
        .collect();

    let items = conferences
        .iter()
        .map(|c| {
            let name = c.key.parent().and_then(|k| names.get(&k)).map(String::as_str);
            ConferenceForm::from_entity(&c.entity, &c.key, name)
        })
        .collect();
    Ok(ConferenceForms { items })
}

pub(crate) fn session_forms(sessions: &[Loaded<Session>]) -> SessionForms {
    SessionForms {
        items: sessions
            .iter()
            .map(|s| SessionForm::from_entity(&s.entity, &s.key))
            .collect(),
    }
}
