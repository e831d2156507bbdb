use common::UserId;
use datastore::{Entity, Key};
use serde::{Deserialize, Serialize};

use crate::identity::CurrentUser;

/// Tee-shirt size: cut (M = men's, W = women's) and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    XsM,
    XsW,
    SM,
    SW,
    MM,
    MW,
    LM,
    LW,
    XlM,
    XlW,
    XxlM,
    XxlW,
    XxxlM,
    XxxlW,
}

/// One profile per user, created lazily on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub main_email: String,
    #[serde(default)]
    pub tee_shirt_size: TeeShirtSize,
    #[serde(default)]
    pub interested_topics: Vec<String>,
    #[serde(default)]
    pub conference_keys_to_attend: Vec<Key>,
    #[serde(default)]
    pub sessions_in_wishlist: Vec<Key>,
}

impl Entity for Profile {
    const KIND: &'static str = "Profile";
}

impl Profile {
    /// Returns the key of a user's profile.
    pub fn key(user_id: &UserId) -> Key {
        Key::named(Self::KIND, user_id.as_str())
    }

    /// Creates the default profile of a user.
    pub fn for_user(user: &CurrentUser) -> Self {
        Self {
            display_name: user.nickname.clone(),
            main_email: user.email.clone(),
            tee_shirt_size: TeeShirtSize::NotSpecified,
            interested_topics: Vec::new(),
            conference_keys_to_attend: Vec::new(),
            sessions_in_wishlist: Vec::new(),
        }
    }

    pub fn is_attending(&self, conference: &Key) -> bool {
        self.conference_keys_to_attend.contains(conference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_shirt_size_wire_names() {
        assert_eq!(
            serde_json::to_value(TeeShirtSize::NotSpecified).unwrap(),
            "NOT_SPECIFIED"
        );
        assert_eq!(serde_json::to_value(TeeShirtSize::XxxlW).unwrap(), "XXXL_W");
        let size: TeeShirtSize = serde_json::from_value("S_M".into()).unwrap();
        assert_eq!(size, TeeShirtSize::SM);
    }

    #[test]
    fn default_profile_uses_identity() {
        let user = CurrentUser::new("u1", "ada@example.com", "ada");
        let profile = Profile::for_user(&user);
        assert_eq!(profile.display_name, "ada");
        assert_eq!(profile.main_email, "ada@example.com");
        assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);
        assert_eq!(Profile::key(&user.user_id), Key::named("Profile", "u1"));
    }
}
