//! Live connections and fan-out.
//!
//! The hub owns the connection → subscriptions map and computes the set of
//! recipients for every broadcast. Message appends and their broadcast happen
//! under the room's write lock, and history snapshots are taken together with
//! the subscription under its read lock, so a subscriber sees every message of
//! a room exactly once.

mod connection;
mod events;

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::rooms::{Message, MessageTime, RoomRegistry};

pub use connection::Connection;
pub use events::{ClientEvent, ServerEvent};

pub struct ConnectionHub {
    rooms: Arc<RoomRegistry>,
    connections: RwLock<HashMap<Uuid, Arc<Connection>>>,
}

impl ConnectionHub {
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self {
            rooms,
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    pub async fn on_connect(
        &self,
        username: Option<String>,
    ) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Connection::new(username, tx));
        let id = conn.id;

        let _ = conn.send(ServerEvent::Connected {
            connection_id: id,
            username: conn.username.clone(),
        });

        let mut connections = self.connections.write().await;
        connections.insert(id, Arc::clone(&conn));
        tracing::info!(
            connection_id = %id,
            username = conn.username.as_deref().unwrap_or("-"),
            total_connections = connections.len(),
            "connection opened"
        );

        (id, rx)
    }

    /// Drops the connection and its subscriptions. Room membership is untouched.
    pub async fn on_disconnect(&self, id: Uuid) {
        let mut connections = self.connections.write().await;
        if let Some(conn) = connections.remove(&id) {
            let rooms = conn.subscriptions().await.len();
            tracing::info!(
                connection_id = %id,
                rooms,
                remaining_connections = connections.len(),
                "connection closed"
            );
        }
    }

    async fn connection(&self, id: Uuid) -> Option<Arc<Connection>> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Subscribes the connection and sends it the room history as one batch.
    pub async fn subscribe(&self, id: Uuid, room_id: &str) {
        let Some(conn) = self.connection(id).await else {
            tracing::debug!(connection_id = %id, room_id, "subscribe from unknown connection");
            return;
        };

        let (messages, _room) = self.rooms.history_locked(room_id).await;

        conn.subscribe(room_id).await;
        tracing::debug!(connection_id = %id, room_id, messages = messages.len(), "subscribed");

        let _ = conn.send(ServerEvent::ChatHistory {
            room: room_id.to_owned(),
            messages,
        });
    }

    pub async fn unsubscribe(&self, id: Uuid, room_id: &str) {
        if let Some(conn) = self.connection(id).await {
            if conn.unsubscribe(room_id).await {
                tracing::debug!(connection_id = %id, room_id, "unsubscribed");
            }
        }
    }

    /// Adds the joiner to the room, then subscribes. The joiner is `username`
    /// when given, else the connection's identity; with neither it only subscribes.
    pub async fn join(&self, id: Uuid, room_id: &str, username: Option<String>) {
        let Some(conn) = self.connection(id).await else {
            return;
        };

        let joiner = username
            .filter(|u| !u.is_empty())
            .or_else(|| conn.username.clone());
        if let Some(joiner) = joiner {
            self.rooms.join(room_id, &joiner).await;
        }
        self.subscribe(id, room_id).await;
    }

    /// Delivers `event` to every connection subscribed to `room_id` and returns
    /// how many received it.
    ///
    /// Callers publishing a message must append it to the room history first.
    pub async fn broadcast(&self, room_id: &str, event: ServerEvent) -> usize {
        let connections = self.connections.read().await;

        let mut delivered = 0;
        for conn in connections.values() {
            if !conn.is_subscribed(room_id).await {
                continue;
            }
            match conn.send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::debug!(connection_id = %conn.id, room_id, "dropping event for closed connection"),
            }
        }

        tracing::debug!(room_id, delivered, "broadcast");
        delivered
    }

    /// Announces a room to every live connection, subscribed or not.
    pub async fn notify_room_created(&self, room_id: &str, participants: Vec<String>) {
        let event = ServerEvent::ChatCreated {
            room: room_id.to_owned(),
            participants,
        };

        let connections = self.connections.read().await;
        for conn in connections.values() {
            let _ = conn.send(event.clone());
        }
        tracing::info!(room_id, notified = connections.len(), "chat created");
    }

    pub async fn send_message(
        &self,
        room_id: &str,
        author: String,
        text: String,
        time: MessageTime,
    ) -> Message {
        let (msg, _room) = self.rooms.append_locked(room_id, author, text, time).await;
        self.broadcast(room_id, ServerEvent::ReceiveMessage(msg.clone())).await;
        msg
    }

    pub async fn create_chat(&self, room_id: &str, participants: &[String]) -> Vec<String> {
        let participants = self.rooms.add_participants(room_id, participants).await;
        self.notify_room_created(room_id, participants.clone()).await;
        participants
    }

    pub async fn handle_event(&self, id: Uuid, event: ClientEvent) {
        match event {
            ClientEvent::Join { room, username } if !room.is_empty() => self.join(id, &room, username).await,
            ClientEvent::Leave { room } if !room.is_empty() => self.unsubscribe(id, &room).await,
            ClientEvent::SendMessage { room, author, text, time } if !room.is_empty() => {
                let author = match author.filter(|a| !a.is_empty()) {
                    Some(author) => Some(author),
                    None => self.connection(id).await.and_then(|c| c.username.clone()),
                };
                let Some(author) = author else {
                    tracing::warn!(connection_id = %id, room = %room, "dropping message without author");
                    return;
                };
                self.send_message(&room, author, text, time).await;
            }
            ClientEvent::CreateChat { room, participants } if !room.is_empty() => {
                self.create_chat(&room, &participants).await;
            }
            event => tracing::warn!(connection_id = %id, ?event, "dropping event with empty room"),
        }
    }

    /// Parses one inbound frame and dispatches it. Bad frames are logged and dropped.
    pub async fn handle_text(&self, id: Uuid, raw: &str) {
        match serde_json::from_str::<ClientEvent>(raw) {
            Ok(event) => self.handle_event(id, event).await,
            Err(e) => tracing::warn!(connection_id = %id, error = %e, frame = raw, "malformed client event"),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
