//! Dispatches background tasks to the projections that own cache entries.

use datastore::Datastore;
use domain::Task;
use domain::tasks::{PARAM_EMAIL, SEND_CONFIRMATION_EMAIL};

use crate::cache::{CacheStore, CacheStoreExt, FEATURED_SPEAKERS_KEY, RECENT_ANNOUNCEMENTS_KEY};
use crate::projection::{CacheUpdate, Projection};
use crate::views::{AnnouncementView, FeaturedSpeakerView};
use crate::{ProjectionError, Result};

/// Owns the cache and every projection writing to it.
///
/// The manager supports:
/// - Task handling: routes a task to the projection registered for its procedure
/// - Reads: returns cached values, empty when absent
/// - Refresh: recomputes the announcement outside of any task
pub struct CacheManager<C: CacheStore> {
    cache: C,
    projections: Vec<Box<dyn Projection>>,
}

impl<C: CacheStore> CacheManager<C> {
    /// Creates a manager without projections.
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            projections: Vec::new(),
        }
    }

    /// Creates a manager with the announcement and featured speaker views.
    pub fn with_defaults<S>(store: S, cache: C) -> Self
    where
        S: Datastore + Clone + 'static,
    {
        let mut manager = Self::new(cache);
        manager.register(Box::new(AnnouncementView::new(store.clone())));
        manager.register(Box::new(FeaturedSpeakerView::new(store)));
        manager
    }

    /// Registers a projection.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Runs one task.
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, procedure = %task.procedure))]
    pub async fn handle(&self, task: &Task) -> Result<()> {
        if task.procedure == SEND_CONFIRMATION_EMAIL {
            tracing::info!(
                email = task.param(PARAM_EMAIL).unwrap_or_default(),
                "conference creation confirmation sent"
            );
            metrics::counter!("confirmation_emails_total").increment(1);
            return Ok(());
        }

        let projection = self
            .projections
            .iter()
            .find(|p| p.procedure() == task.procedure)
            .ok_or_else(|| ProjectionError::UnknownProcedure(task.procedure.clone()))?;

        self.apply(projection.as_ref(), task).await
    }

    async fn apply(&self, projection: &dyn Projection, task: &Task) -> Result<()> {
        let update = projection.recompute(task).await?;
        let key = projection.cache_key();
        match &update {
            CacheUpdate::Set(value) => self.cache.set(key, value.clone()).await?,
            CacheUpdate::Delete => {
                self.cache.delete(key).await?;
            }
            CacheUpdate::Unchanged => {}
        }

        metrics::counter!("cache_recomputes_total", "projection" => projection.name())
            .increment(1);
        tracing::debug!(projection = projection.name(), ?update, "cache recomputed");
        Ok(())
    }

    /// Recomputes the announcement immediately.
    pub async fn refresh_announcement(&self) -> Result<()> {
        self.handle(&Task::set_announcement()).await
    }

    /// Returns the cached announcement, or an empty string.
    pub async fn announcement(&self) -> Result<String> {
        Ok(self.cache.get_or_empty(RECENT_ANNOUNCEMENTS_KEY).await?)
    }

    /// Returns the cached featured speaker summary, or an empty string.
    pub async fn featured_speaker(&self) -> Result<String> {
        Ok(self.cache.get_or_empty(FEATURED_SPEAKERS_KEY).await?)
    }
}
