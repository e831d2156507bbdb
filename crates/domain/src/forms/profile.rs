use serde::{Deserialize, Serialize};

use crate::model::{Profile, TeeShirtSize};

/// Outbound profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: TeeShirtSize,
    pub interested_topics: Vec<String>,
    /// Websafe conference keys.
    pub conference_keys_to_attend: Vec<String>,
    /// Websafe session keys.
    pub sessions_in_wishlist: Vec<String>,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            main_email: profile.main_email.clone(),
            tee_shirt_size: profile.tee_shirt_size,
            interested_topics: profile.interested_topics.clone(),
            conference_keys_to_attend: profile
                .conference_keys_to_attend
                .iter()
                .map(|k| k.websafe())
                .collect(),
            sessions_in_wishlist: profile
                .sessions_in_wishlist
                .iter()
                .map(|k| k.websafe())
                .collect(),
        }
    }
}

/// The user-editable part of a profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMiniForm {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tee_shirt_size: Option<TeeShirtSize>,
}

impl ProfileMiniForm {
    /// Copies the supplied fields onto `profile`. Returns true if anything changed.
    pub fn apply(&self, profile: &mut Profile) -> bool {
        let mut changed = false;
        if let Some(name) = super::non_empty(&self.display_name)
            && name != profile.display_name
        {
            profile.display_name = name.to_string();
            changed = true;
        }
        if let Some(size) = self.tee_shirt_size
            && size != profile.tee_shirt_size
        {
            profile.tee_shirt_size = size;
            changed = true;
        }
        changed
    }
}
