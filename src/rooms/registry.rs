use std::{collections::HashMap, sync::Arc};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use super::{
    msg::{Message, MessageTime},
    room::{Room, RoomSummary},
};

pub type RoomHandle = Arc<RwLock<Room>>;

/// All rooms of the process, keyed by id.
///
/// Rooms are created on first reference and never removed, so every lookup by
/// id succeeds. Each room has its own lock; the map lock is only held long
/// enough to find or insert a handle.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, room_id: &str) -> RoomHandle {
        if let Some(room) = self.rooms.read().await.get(room_id) {
            return Arc::clone(room);
        }

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.to_owned()).or_insert_with(|| {
            tracing::debug!(room_id, "room created");
            Arc::new(RwLock::new(Room::new(room_id)))
        });
        Arc::clone(room)
    }

    /// Adds every name not yet present and returns the resulting participant list.
    pub async fn add_participants<S: AsRef<str>>(
        &self,
        room_id: &str,
        participants: &[S],
    ) -> Vec<String> {
        let room = self.get_or_create(room_id).await;
        let mut room = room.write().await;
        for username in participants {
            room.add_participant(username.as_ref());
        }
        room.participants().to_vec()
    }

    pub async fn join(&self, room_id: &str, username: &str) {
        let room = self.get_or_create(room_id).await;
        if room.write().await.add_participant(username) {
            tracing::debug!(room_id, username, "participant added");
        }
    }

    pub async fn append(
        &self,
        room_id: &str,
        author: String,
        text: String,
        time: MessageTime,
    ) -> Message {
        let (msg, _room) = self.append_locked(room_id, author, text, time).await;
        msg
    }

    /// Like [`append`](Self::append), but the room stays write-locked until the
    /// returned guard drops.
    pub(crate) async fn append_locked(
        &self,
        room_id: &str,
        author: String,
        text: String,
        time: MessageTime,
    ) -> (Message, OwnedRwLockWriteGuard<Room>) {
        let mut room = self.get_or_create(room_id).await.write_owned().await;
        let msg = room.append(author, text, time);
        (msg, room)
    }

    pub async fn history(&self, room_id: &str) -> Vec<Message> {
        let (history, _room) = self.history_locked(room_id).await;
        history
    }

    /// History plus a read guard; no append can land until the guard drops.
    pub(crate) async fn history_locked(
        &self,
        room_id: &str,
    ) -> (Vec<Message>, OwnedRwLockReadGuard<Room>) {
        let room = self.get_or_create(room_id).await.read_owned().await;
        (room.history().to_vec(), room)
    }

    pub async fn rooms_for(&self, username: &str) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut chats = Vec::new();
        for handle in handles {
            let room = handle.read().await;
            if room.is_participant(username) {
                chats.push(room.summary());
            }
        }
        chats.sort_by(|a, b| a.room.cmp(&b.room));
        chats
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let rooms = RoomRegistry::new();
        let a = rooms.get_or_create("lobby").await;
        let b = rooms.get_or_create("lobby").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(rooms.room_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_room_has_empty_history() {
        let rooms = RoomRegistry::new();
        assert!(rooms.history("nowhere").await.is_empty());
        assert!(rooms.rooms_for("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn history_keeps_append_order() {
        let rooms = RoomRegistry::new();
        let mut appended = Vec::new();
        for i in 0..20 {
            appended.push(
                rooms
                    .append("r", format!("u{}", i % 3), format!("m{i}"), MessageTime::from(i as i64))
                    .await,
            );
        }

        let history = rooms.history("r").await;
        assert_eq!(history, appended);
        assert!(history.iter().enumerate().all(|(i, m)| m.seq == i as u64));
    }

    #[tokio::test]
    async fn history_guard_holds_back_appends() {
        let rooms = Arc::new(RoomRegistry::new());
        rooms.append("r", "a".into(), "first".into(), "t".into()).await;

        let (snapshot, guard) = rooms.history_locked("r").await;
        let writer = {
            let rooms = Arc::clone(&rooms);
            tokio::spawn(async move { rooms.append("r", "b".into(), "second".into(), "t".into()).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(guard.history().len(), 1);
        drop(guard);

        assert_eq!(writer.await.unwrap().seq, 1);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(rooms.history("r").await.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_appends_get_distinct_positions() {
        let rooms = Arc::new(RoomRegistry::new());
        let mut tasks = Vec::new();
        for i in 0..50 {
            let rooms = Arc::clone(&rooms);
            tasks.push(tokio::spawn(async move {
                rooms.append("busy", "u".into(), format!("m{i}"), "t".into()).await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let history = rooms.history("busy").await;
        assert_eq!(history.len(), 50);
        assert!(history.iter().enumerate().all(|(i, m)| m.seq == i as u64));
    }

    #[tokio::test]
    async fn add_participants_is_a_union() {
        let rooms = RoomRegistry::new();
        rooms.add_participants("r", &["alice", "bob"]).await;
        let merged = rooms.add_participants("r", &["bob", "carol"]).await;

        assert_eq!(merged, ["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn join_grants_membership() {
        let rooms = RoomRegistry::new();
        rooms.join("r1", "dave").await;
        rooms.join("r1", "dave").await;
        rooms.append("r1", "dave".into(), "hello".into(), "t1".into()).await;
        rooms.join("r2", "erin").await;

        let chats = rooms.rooms_for("dave").await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].room, "r1");
        assert_eq!(chats[0].participants, ["dave"]);
        assert_eq!(chats[0].last_message, "hello");
    }

    #[tokio::test]
    async fn rooms_for_is_sorted_by_id() {
        let rooms = RoomRegistry::new();
        for id in ["zeta", "alpha", "mid"] {
            rooms.join(id, "frank").await;
        }

        let ids: Vec<_> = rooms.rooms_for("frank").await.into_iter().map(|c| c.room).collect();
        assert_eq!(ids, ["alpha", "mid", "zeta"]);
        assert_eq!(rooms.rooms_for("frank").await[0].last_message, "");
    }
}
