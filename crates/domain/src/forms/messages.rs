use serde::{Deserialize, Serialize};

/// A single boolean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanMessage {
    pub data: bool,
}

impl From<bool> for BooleanMessage {
    fn from(data: bool) -> Self {
        Self { data }
    }
}

/// A single string result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringMessage {
    pub data: String,
}

impl From<String> for StringMessage {
    fn from(data: String) -> Self {
        Self { data }
    }
}
