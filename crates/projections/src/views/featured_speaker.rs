//! Featured speaker: a speaker with two or more sessions.

use async_trait::async_trait;
use datastore::{Datastore, DatastoreExt, Key};
use domain::tasks::{PARAM_SPEAKER_KEY, SET_FEATURED_SPEAKER};
use domain::{Speaker, Task};

use crate::cache::FEATURED_SPEAKERS_KEY;
use crate::projection::{CacheUpdate, Projection};
use crate::{ProjectionError, Result};

/// Renders the speaker named by a task when they speak at 2+ sessions,
/// clears the entry otherwise.
#[derive(Clone)]
pub struct FeaturedSpeakerView<S> {
    store: S,
}

impl<S: Datastore> FeaturedSpeakerView<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Renders the summary line of a speaker.
    pub fn render(speaker: &Speaker) -> String {
        format!(
            "Featured Speaker: {} | Sessions: {}",
            speaker.name,
            speaker.sessions.join(", ")
        )
    }
}

#[async_trait]
impl<S: Datastore> Projection for FeaturedSpeakerView<S> {
    fn name(&self) -> &'static str {
        "FeaturedSpeakerView"
    }

    fn procedure(&self) -> &'static str {
        SET_FEATURED_SPEAKER
    }

    fn cache_key(&self) -> &'static str {
        FEATURED_SPEAKERS_KEY
    }

    async fn recompute(&self, task: &Task) -> Result<CacheUpdate> {
        let websafe = task
            .param(PARAM_SPEAKER_KEY)
            .ok_or_else(|| ProjectionError::MissingParam {
                procedure: task.procedure.clone(),
                param: PARAM_SPEAKER_KEY,
            })?;

        let Ok(key) = Key::from_websafe(websafe) else {
            tracing::warn!(speaker_key = websafe, "featured speaker key is malformed");
            return Ok(CacheUpdate::Unchanged);
        };

        match self.store.get_entity::<Speaker>(&key).await? {
            Some(speaker) if speaker.entity.is_featured() => {
                Ok(CacheUpdate::Set(Self::render(&speaker.entity)))
            }
            Some(_) => Ok(CacheUpdate::Delete),
            None => {
                tracing::warn!(%key, "featured speaker no longer exists");
                Ok(CacheUpdate::Unchanged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datastore::InMemoryDatastore;

    async fn store_speaker(store: &InMemoryDatastore, sessions: &[&str]) -> Key {
        let key = Speaker::key_for("Grace Hopper").unwrap();
        let mut speaker = Speaker::new("Grace Hopper");
        for (i, name) in sessions.iter().enumerate() {
            speaker.add_session(name, &Key::with_id("Session", i as i64 + 1));
        }
        store.put_entity(&key, &speaker).await.unwrap();
        key
    }

    #[tokio::test]
    async fn two_sessions_are_featured() {
        let store = InMemoryDatastore::new();
        let key = store_speaker(&store, &["COBOL", "Compilers"]).await;
        let view = FeaturedSpeakerView::new(store);

        assert_eq!(
            view.recompute(&Task::set_featured_speaker(&key)).await.unwrap(),
            CacheUpdate::Set("Featured Speaker: Grace Hopper | Sessions: COBOL, Compilers".into())
        );
    }

    #[tokio::test]
    async fn one_session_deletes() {
        let store = InMemoryDatastore::new();
        let key = store_speaker(&store, &["COBOL"]).await;
        let view = FeaturedSpeakerView::new(store);

        assert_eq!(
            view.recompute(&Task::set_featured_speaker(&key)).await.unwrap(),
            CacheUpdate::Delete
        );
    }

    #[tokio::test]
    async fn unresolvable_speaker_is_unchanged() {
        let view = FeaturedSpeakerView::new(InMemoryDatastore::new());
        let missing = Speaker::key_for("Nobody").unwrap();
        assert_eq!(
            view.recompute(&Task::set_featured_speaker(&missing)).await.unwrap(),
            CacheUpdate::Unchanged
        );

        let garbage = Task::new(SET_FEATURED_SPEAKER).with_param(PARAM_SPEAKER_KEY, "%%");
        assert_eq!(view.recompute(&garbage).await.unwrap(), CacheUpdate::Unchanged);

        let bare = Task::new(SET_FEATURED_SPEAKER);
        assert!(matches!(
            view.recompute(&bare).await,
            Err(ProjectionError::MissingParam { .. })
        ));
    }
}
