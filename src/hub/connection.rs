use std::collections::HashSet;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::events::ServerEvent;

#[derive(Debug)]
pub struct Connection {
    pub id: Uuid,
    /// `None` until the client has logged in on the HTTP side.
    pub username: Option<String>,
    sender: mpsc::UnboundedSender<ServerEvent>,
    rooms: RwLock<HashSet<String>>,
}

impl Connection {
    pub(crate) fn new(username: Option<String>, sender: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username,
            sender,
            rooms: RwLock::new(HashSet::new()),
        }
    }

    /// Queues an event for the socket writer. Fails only when the writer is gone.
    #[allow(clippy::result_large_err)]
    pub(crate) fn send(&self, event: ServerEvent) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event)
    }

    pub(crate) async fn subscribe(&self, room_id: &str) -> bool {
        self.rooms.write().await.insert(room_id.to_owned())
    }

    pub(crate) async fn unsubscribe(&self, room_id: &str) -> bool {
        self.rooms.write().await.remove(room_id)
    }

    pub async fn is_subscribed(&self, room_id: &str) -> bool {
        self.rooms.read().await.contains(room_id)
    }

    pub async fn subscriptions(&self) -> HashSet<String> {
        self.rooms.read().await.clone()
    }
}
