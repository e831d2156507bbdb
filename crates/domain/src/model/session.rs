use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use datastore::{Entity, Key};
use serde::{Deserialize, Serialize};

/// Sessions ending strictly before this hour on their own date "finish before seven".
pub const CUTOFF_HOUR: u32 = 19;

/// A session of a conference. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub speaker_key: Option<Key>,
    /// Length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub type_of_session: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date_time: NaiveDateTime,
    pub finish_before_seven: bool,
}

impl Entity for Session {
    const KIND: &'static str = "Session";
}

/// The derived timing fields of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub end_date_time: NaiveDateTime,
    pub finish_before_seven: bool,
}

impl Schedule {
    pub fn compute(date: NaiveDate, start_time: NaiveTime, duration_minutes: u32) -> Self {
        let end_date_time = date.and_time(start_time) + Duration::minutes(i64::from(duration_minutes));
        let finish_before_seven =
            end_date_time.date() == date && end_date_time.time().hour() < CUTOFF_HOUR;
        Self {
            end_date_time,
            finish_before_seven,
        }
    }
}

impl Session {
    /// Creates a session, deriving its end time from start time and duration.
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Self {
        let schedule = Schedule::compute(date, start_time, duration_minutes);
        Self {
            name: name.into(),
            highlights: None,
            speaker: None,
            speaker_key: None,
            duration: duration_minutes,
            type_of_session: None,
            date,
            start_time,
            end_date_time: schedule.end_date_time,
            finish_before_seven: schedule.finish_before_seven,
        }
    }

    /// Returns the key of the conference owning a session.
    pub fn conference_key(session: &Key) -> Option<Key> {
        session.parent()
    }

    /// Case-insensitive check of the session type.
    pub fn is_type(&self, type_of_session: &str) -> bool {
        self.type_of_session
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(type_of_session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn end_time_is_start_plus_duration() {
        let session = Session::new("Intro", date("2026-05-01"), time(17, 30), 90);
        assert_eq!(session.end_date_time, date("2026-05-01").and_time(time(19, 0)));
        assert!(!session.finish_before_seven);

        let session = Session::new("Intro", date("2026-05-01"), time(17, 30), 89);
        assert!(session.finish_before_seven);
    }

    #[test]
    fn crossing_midnight_never_finishes_before_seven() {
        let session = Session::new("Late", date("2026-05-01"), time(23, 0), 120);
        assert_eq!(session.end_date_time.date(), date("2026-05-02"));
        assert!(!session.finish_before_seven);
    }

    #[test]
    fn type_match_ignores_case() {
        let mut session = Session::new("W", date("2026-05-01"), time(9, 0), 60);
        assert!(!session.is_type("workshop"));
        session.type_of_session = Some("Workshop".into());
        assert!(session.is_type("workshop"));
    }
}
