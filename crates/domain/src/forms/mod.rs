//! Wire representations of entities and explicit mappings to and from them.
//!
//! Dates travel as `YYYY-MM-DD`, times and durations as `HH:MM`. Incoming
//! values are parsed strictly; derived identifiers such as `websafeKey`
//! are synthesized on the way out and never stored.

mod conference;
mod messages;
mod profile;
mod query;
mod session;

pub use conference::{ConferenceForm, ConferenceForms};
pub use messages::{BooleanMessage, StringMessage};
pub use profile::{ProfileForm, ProfileMiniForm};
pub use query::{ConferenceQueryForm, ConferenceQueryForms};
pub use session::{SessionForm, SessionForms};

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|d| format_date(d) == value)
        .ok_or_else(|| DomainError::Validation(format!("'{field}' must be YYYY-MM-DD, got '{value}'")))
}

/// Parses an `HH:MM` time of day.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .filter(|t| format_time(t) == value)
        .ok_or_else(|| DomainError::Validation(format!("'{field}' must be HH:MM, got '{value}'")))
}

/// Parses an `HH:MM` duration into minutes.
pub fn parse_duration(field: &str, value: &str) -> Result<u32, DomainError> {
    let time = parse_time(field, value)?;
    Ok(time.hour() * 60 + time.minute())
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Formats minutes as `HH:MM`.
pub fn format_duration(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// Empty strings count as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
