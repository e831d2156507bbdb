use datastore::Key;
use serde::{Deserialize, Serialize};

use super::{format_date, format_duration, format_time, non_empty, parse_date, parse_duration, parse_time};
use crate::error::DomainError;
use crate::model::Session;

/// Wire form of a session.
///
/// `name`, `duration`, `date` and `startTime` are required on creation.
/// `websafeKey` and `websafeConferenceKey` are synthesized on the way out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_session: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_conference_key: Option<String>,
}

impl SessionForm {
    pub fn from_entity(session: &Session, key: &Key) -> Self {
        Self {
            name: Some(session.name.clone()),
            highlights: session.highlights.clone(),
            speaker: session.speaker.clone(),
            duration: Some(format_duration(session.duration)),
            type_of_session: session.type_of_session.clone(),
            date: Some(format_date(&session.date)),
            start_time: Some(format_time(&session.start_time)),
            websafe_key: Some(key.websafe()),
            websafe_conference_key: Session::conference_key(key).map(|k| k.websafe()),
        }
    }

    /// Builds a new session. The speaker reference is resolved by the caller.
    pub fn to_session(&self) -> Result<Session, DomainError> {
        let name = required(&self.name, "name")?;
        let duration = parse_duration("duration", required(&self.duration, "duration")?)?;
        let date = parse_date("date", required(&self.date, "date")?)?;
        let start_time = parse_time("startTime", required(&self.start_time, "startTime")?)?;

        let mut session = Session::new(name, date, start_time, duration);
        session.highlights = non_empty(&self.highlights).map(String::from);
        session.speaker = non_empty(&self.speaker).map(|s| s.trim().to_string());
        session.type_of_session = non_empty(&self.type_of_session).map(String::from);
        Ok(session)
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, DomainError> {
    non_empty(value).ok_or_else(|| DomainError::Validation(format!("Session '{field}' field required")))
}

/// A list of sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionForms {
    pub items: Vec<SessionForm>,
}
