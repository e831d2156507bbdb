//! Announcement of conferences that are nearly sold out.

use async_trait::async_trait;
use datastore::{Datastore, DatastoreExt, EntityQuery, FilterOp};
use domain::tasks::SET_ANNOUNCEMENT;
use domain::{Conference, Task};

use crate::Result;
use crate::cache::RECENT_ANNOUNCEMENTS_KEY;
use crate::projection::{CacheUpdate, Projection};

/// Conferences with at least one and at most this many seats left are announced.
pub const NEARLY_SOLD_OUT_SEATS: i64 = 5;

pub const ANNOUNCEMENT_PREFIX: &str =
    "Last chance to attend! The following conferences are nearly sold out: ";

/// Lists every conference with `0 < seatsAvailable <= 5`, or clears the
/// announcement when there is none.
#[derive(Clone)]
pub struct AnnouncementView<S> {
    store: S,
}

impl<S: Datastore> AnnouncementView<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the names of nearly sold out conferences, fewest seats first.
    pub async fn nearly_sold_out(&self) -> Result<Vec<String>> {
        let query = EntityQuery::for_entity::<Conference>()
            .filter("seatsAvailable", FilterOp::GreaterThan, 0)
            .filter("seatsAvailable", FilterOp::LessThanOrEqual, NEARLY_SOLD_OUT_SEATS)
            .order("seatsAvailable")
            .order("name");
        let conferences = self.store.query_entities::<Conference>(query).await?;
        Ok(conferences.into_iter().map(|c| c.entity.name).collect())
    }
}

#[async_trait]
impl<S: Datastore> Projection for AnnouncementView<S> {
    fn name(&self) -> &'static str {
        "AnnouncementView"
    }

    fn procedure(&self) -> &'static str {
        SET_ANNOUNCEMENT
    }

    fn cache_key(&self) -> &'static str {
        RECENT_ANNOUNCEMENTS_KEY
    }

    async fn recompute(&self, _task: &Task) -> Result<CacheUpdate> {
        let names = self.nearly_sold_out().await?;
        if names.is_empty() {
            return Ok(CacheUpdate::Delete);
        }
        Ok(CacheUpdate::Set(format!("{ANNOUNCEMENT_PREFIX}{}", names.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use datastore::{InMemoryDatastore, Key};

    fn conference(name: &str, max: i64, seats: i64) -> Conference {
        Conference {
            name: name.into(),
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

    #[tokio::test]
    async fn lists_only_nearly_sold_out() {
        let store = InMemoryDatastore::new();
        let organizer = Key::named("Profile", "org");
        for (id, (name, max, seats)) in [
            ("Full", 10, 0),
            ("Almost", 10, 2),
            ("Roomy", 10, 6),
            ("Edge", 5, 5),
            ("AlsoTwo", 3, 2),
        ]
        .into_iter()
        .enumerate()
        {
            let key = organizer.child_id("Conference", id as i64 + 1);
            store.put_entity(&key, &conference(name, max, seats)).await.unwrap();
        }

        let view = AnnouncementView::new(store);
        assert_eq!(view.nearly_sold_out().await.unwrap(), vec!["Almost", "AlsoTwo", "Edge"]);
        assert_eq!(
            view.recompute(&Task::set_announcement()).await.unwrap(),
            CacheUpdate::Set(format!("{ANNOUNCEMENT_PREFIX}Almost, AlsoTwo, Edge"))
        );
    }

    #[tokio::test]
    async fn nothing_to_announce_deletes() {
        let view = AnnouncementView::new(InMemoryDatastore::new());
        assert_eq!(
            view.recompute(&Task::set_announcement()).await.unwrap(),
            CacheUpdate::Delete
        );
    }
}
