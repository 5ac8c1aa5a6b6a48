//! WebSocket frames. Every frame is `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rooms::{Message, MessageTime};

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join")]
    Join {
        room: String,
        /// Clients without a session cookie name themselves here.
        #[serde(default)]
        username: Option<String>,
    },

    #[serde(rename = "leave")]
    Leave { room: String },

    #[serde(rename = "send message")]
    SendMessage {
        room: String,
        /// Falls back to the connection identity when absent.
        #[serde(default)]
        author: Option<String>,
        text: String,
        time: MessageTime,
    },

    #[serde(rename = "create chat")]
    CreateChat {
        room: String,
        participants: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "connected")]
    Connected {
        connection_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    #[serde(rename = "chat history")]
    ChatHistory { room: String, messages: Vec<Message> },

    #[serde(rename = "receive message")]
    ReceiveMessage(Message),

    #[serde(rename = "chat created")]
    ChatCreated {
        room: String,
        participants: Vec<String>,
    },
}
