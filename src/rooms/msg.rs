use serde::{Deserialize, Serialize};

/// Client-supplied timestamp, stored and echoed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTime {
    Text(String),
    Number(serde_json::Number),
}

impl From<&str> for MessageTime {
    fn from(time: &str) -> Self {
        MessageTime::Text(time.to_owned())
    }
}

impl From<i64> for MessageTime {
    fn from(time: i64) -> Self {
        MessageTime::Number(time.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub room: String,
    /// Position in the room history, starting at 0.
    pub seq: u64,
    pub author: String,
    pub text: String,
    pub time: MessageTime,
}
