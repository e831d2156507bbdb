use common::UserId;
use datastore::Key;
use serde::{Deserialize, Serialize};

use super::{format_date, non_empty, parse_date};
use crate::error::DomainError;
use crate::model::{Conference, DEFAULT_CITY, DEFAULT_MAX_ATTENDEES, DEFAULT_TOPICS};

/// Wire form of a conference.
///
/// | field                  | create                 | update                  | out             |
/// |------------------------|------------------------|-------------------------|-----------------|
/// | name                   | required               | copied if non-empty     | yes             |
/// | description            | optional               | copied if non-empty     | yes             |
/// | topics                 | default `Default,Topic`| copied if non-empty     | yes             |
/// | city                   | default `Default City` | copied if non-empty     | yes             |
/// | startDate, endDate     | optional, strict       | copied if non-empty     | `YYYY-MM-DD`    |
/// | month                  | derived                | ignored (derived)       | yes             |
/// | maxAttendees           | default 0              | shifts seats by delta   | yes             |
/// | seatsAvailable         | ignored (= max)        | ignored                 | yes             |
/// | organizerUserId        | caller                 | ignored                 | yes             |
/// | websafeKey             | -                      | -                       | synthesized     |
/// | organizerDisplayName   | -                      | -                       | synthesized     |
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_display_name: Option<String>,
}

impl ConferenceForm {
    /// Renders a stored conference.
    pub fn from_entity(conference: &Conference, key: &Key, organizer_display_name: Option<&str>) -> Self {
        Self {
            name: Some(conference.name.clone()),
            description: conference.description.clone(),
            organizer_user_id: Some(conference.organizer_user_id.to_string()),
            topics: Some(conference.topics.clone()),
            city: conference.city.clone(),
            start_date: conference.start_date.as_ref().map(format_date),
            month: Some(conference.month),
            max_attendees: Some(conference.max_attendees),
            seats_available: Some(conference.seats_available),
            end_date: conference.end_date.as_ref().map(format_date),
            websafe_key: Some(key.websafe()),
            organizer_display_name: organizer_display_name.map(String::from),
        }
    }

    /// Builds a new conference organized by `organizer`, applying defaults.
    pub fn to_new_conference(&self, organizer: &UserId) -> Result<Conference, DomainError> {
        let name = non_empty(&self.name)
            .ok_or_else(|| DomainError::Validation("Conference 'name' field required".into()))?;

        let max_attendees = self.max_attendees.unwrap_or(DEFAULT_MAX_ATTENDEES);
        if max_attendees < 0 {
            return Err(DomainError::Validation(
                "'maxAttendees' must not be negative".into(),
            ));
        }

        let topics = match &self.topics {
            Some(topics) if !topics.is_empty() => topics.clone(),
            _ => DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
        };

        let mut conference = Conference {
            name: name.to_string(),
            description: non_empty(&self.description).map(String::from),
            topics,
            city: Some(non_empty(&self.city).unwrap_or(DEFAULT_CITY).to_string()),
            start_date: None,
            end_date: self.parsed_end_date()?,
            month: 0,
            max_attendees,
            seats_available: max_attendees,
            organizer_user_id: organizer.clone(),
        };
        conference.set_start_date(self.parsed_start_date()?);
        Ok(conference)
    }

    /// Copies the supplied fields onto an existing conference.
    ///
    /// Fails without touching `conference` when a field is malformed or a new
    /// `maxAttendees` is below the seats already taken.
    pub fn apply_update(&self, conference: &mut Conference) -> Result<(), DomainError> {
        let start_date = self.parsed_start_date()?;
        let end_date = self.parsed_end_date()?;

        let seats = match self.max_attendees {
            Some(max) if max != conference.max_attendees => {
                let taken = conference.seats_taken();
                if max < taken {
                    return Err(DomainError::Validation(format!(
                        "'maxAttendees' {max} is below the {taken} seats already taken"
                    )));
                }
                Some((max, max - taken))
            }
            _ => None,
        };

        if let Some(name) = non_empty(&self.name) {
            conference.name = name.to_string();
        }
        if let Some(description) = non_empty(&self.description) {
            conference.description = Some(description.to_string());
        }
        if let Some(topics) = self.topics.as_ref().filter(|t| !t.is_empty()) {
            conference.topics = topics.clone();
        }
        if let Some(city) = non_empty(&self.city) {
            conference.city = Some(city.to_string());
        }
        if start_date.is_some() {
            conference.set_start_date(start_date);
        }
        if end_date.is_some() {
            conference.end_date = end_date;
        }
        if let Some((max, seats_available)) = seats {
            conference.max_attendees = max;
            conference.seats_available = seats_available;
        }
        Ok(())
    }

    fn parsed_start_date(&self) -> Result<Option<chrono::NaiveDate>, DomainError> {
        non_empty(&self.start_date)
            .map(|d| parse_date("startDate", d))
            .transpose()
    }

    fn parsed_end_date(&self) -> Result<Option<chrono::NaiveDate>, DomainError> {
        non_empty(&self.end_date)
            .map(|d| parse_date("endDate", d))
            .transpose()
    }
}

/// A list of conferences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConferenceForms {
    pub items: Vec<ConferenceForm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organizer() -> UserId {
        UserId::new("org")
    }

    fn named(name: &str) -> ConferenceForm {
        ConferenceForm {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let conference = named("RustConf").to_new_conference(&organizer()).unwrap();
        assert_eq!(conference.city.as_deref(), Some(DEFAULT_CITY));
        assert_eq!(conference.topics, vec!["Default", "Topic"]);
        assert_eq!(conference.max_attendees, 0);
        assert_eq!(conference.seats_available, 0);
        assert_eq!(conference.month, 0);
        assert_eq!(conference.organizer_user_id, organizer());
    }

    #[test]
    fn create_requires_name_and_derives_month() {
        assert!(matches!(
            ConferenceForm::default().to_new_conference(&organizer()),
            Err(DomainError::Validation(_))
        ));

        let form = ConferenceForm {
            start_date: Some("2026-11-02".into()),
            max_attendees: Some(40),
            seats_available: Some(3),
            month: Some(1),
            ..named("RustConf")
        };
        let conference = form.to_new_conference(&organizer()).unwrap();
        assert_eq!(conference.month, 11);
        assert_eq!(conference.seats_available, 40);
    }

    #[test]
    fn malformed_date_is_validation_error() {
        let form = ConferenceForm {
            end_date: Some("2026/11/02".into()),
            ..named("RustConf")
        };
        assert!(matches!(
            form.to_new_conference(&organizer()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn update_shifts_seats_with_capacity() {
        let form = ConferenceForm {
            max_attendees: Some(10),
            ..named("RustConf")
        };
        let mut conference = form.to_new_conference(&organizer()).unwrap();
        conference.seats_available = 7;

        let update = ConferenceForm {
            max_attendees: Some(20),
            start_date: Some("2026-04-01".into()),
            seats_available: Some(99),
            ..Default::default()
        };
        update.apply_update(&mut conference).unwrap();
        assert_eq!(conference.max_attendees, 20);
        assert_eq!(conference.seats_available, 17);
        assert_eq!(conference.month, 4);
        assert_eq!(conference.name, "RustConf");

        let shrink = ConferenceForm {
            max_attendees: Some(2),
            name: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(matches!(
            shrink.apply_update(&mut conference),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(conference.name, "RustConf");
    }

    #[test]
    fn form_round_trip_preserves_fields() {
        let form = ConferenceForm {
            description: Some("All things Rust".into()),
            topics: Some(vec!["Rust".into()]),
            city: Some("Portland".into()),
            start_date: Some("2026-09-10".into()),
            end_date: Some("2026-09-12".into()),
            max_attendees: Some(100),
            ..named("RustConf")
        };
        let conference = form.to_new_conference(&organizer()).unwrap();
        let key = Key::named("Profile", "org").child_id("Conference", 1);

        let out = ConferenceForm::from_entity(&conference, &key, Some("Org"));
        assert_eq!(out.websafe_key, Some(key.websafe()));
        assert_eq!(out.organizer_display_name.as_deref(), Some("Org"));

        let again = out.to_new_conference(&organizer()).unwrap();
        assert_eq!(again, conference);
    }
}
