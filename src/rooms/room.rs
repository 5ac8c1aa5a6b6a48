use serde::Serialize;

use super::msg::{Message, MessageTime};

#[derive(Debug)]
pub struct Room {
    id: String,
    participants: Vec<String>,
    history: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room: String,
    pub participants: Vec<String>,
    pub last_message: String,
}

impl Room {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            participants: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn is_participant(&self, username: &str) -> bool {
        self.participants.iter().any(|p| p == username)
    }

    /// Returns false if `username` was already a participant.
    pub(crate) fn add_participant(&mut self, username: &str) -> bool {
        if self.is_participant(username) {
            return false;
        }
        self.participants.push(username.to_owned());
        true
    }

    pub(crate) fn append(&mut self, author: String, text: String, time: MessageTime) -> Message {
        let msg = Message {
            room: self.id.clone(),
            seq: self.history.len() as u64,
            author,
            text,
            time,
        };
        self.history.push(msg.clone());
        msg
    }

    pub fn last_message_text(&self) -> &str {
        self.history.last().map(|m| m.text.as_str()).unwrap_or("")
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room: self.id.clone(),
            participants: self.participants.clone(),
            last_message: self.last_message_text().to_owned(),
        }
    }
}
