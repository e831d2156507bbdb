use serde::{Deserialize, Serialize};

/// One `field operator value` search condition, e.g. `CITY EQ London`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceQueryForm {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl ConferenceQueryForm {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Conditions combined with logical AND.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConferenceQueryForms {
    #[serde(default)]
    pub filters: Vec<ConferenceQueryForm>,
}
