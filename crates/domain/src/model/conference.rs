use chrono::{Datelike, NaiveDate};
use common::UserId;
use datastore::{Entity, Key};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CITY: &str = "Default City";
pub const DEFAULT_MAX_ATTENDEES: i64 = 0;
pub const DEFAULT_TOPICS: [&str; 2] = ["Default", "Topic"];

/// A conference, owned by its organizer's profile.
///
/// `month` mirrors `start_date` (0 when there is none) and
/// `0 <= seats_available <= max_attendees` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub month: u32,
    pub max_attendees: i64,
    pub seats_available: i64,
    pub organizer_user_id: UserId,
}

impl Entity for Conference {
    const KIND: &'static str = "Conference";
}

impl Conference {
    /// Returns the month number of a start date, 0 when there is none.
    pub fn month_of(start_date: Option<NaiveDate>) -> u32 {
        start_date.map(|d| d.month()).unwrap_or(0)
    }

    /// Sets the start date and re-derives the month.
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
        self.month = Self::month_of(start_date);
    }

    pub fn seats_taken(&self) -> i64 {
        self.max_attendees - self.seats_available
    }

    /// Returns the organizer's profile key, which is this conference's parent.
    pub fn organizer_key(conference: &Key) -> Option<Key> {
        conference.parent()
    }
}
