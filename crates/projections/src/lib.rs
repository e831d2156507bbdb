//! Derived caches for the conference backend.
//!
//! This crate provides:
//! - [`CacheStore`] and the [`InMemoryCache`] backend
//! - [`Projection`] recomputations for the announcement and featured speaker
//! - [`CacheManager`] dispatching tasks to projections
//! - [`TaskWorker`] and [`ChannelTaskQueue`] delivering tasks in the background

pub mod cache;
pub mod error;
pub mod processor;
pub mod projection;
pub mod views;
pub mod worker;

pub use cache::{CacheError, CacheStore, CacheStoreExt, FEATURED_SPEAKERS_KEY, InMemoryCache, RECENT_ANNOUNCEMENTS_KEY};
pub use error::{ProjectionError, Result};
pub use processor::CacheManager;
pub use projection::{CacheUpdate, Projection};
pub use views::{AnnouncementView, FeaturedSpeakerView};
pub use worker::{ChannelTaskQueue, TaskWorker, WorkerStats, channel, spawn_announcement_refresh};
