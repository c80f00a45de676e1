//! In-memory message store
//!
//! One append-only log per room, each behind its own async mutex so that
//! id assignment is serialized per room (room-level contention, never a
//! global lock).

use async_trait::async_trait;
use dashmap::DashMap;
use roomcast_core::{Identity, Message, MessageId, MessageKind, MessageStore, StoreResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Append log for a single room
#[derive(Debug, Default)]
struct RoomLog {
    /// Last id handed out; ids start at 1
    last_id: u64,
    messages: Vec<Message>,
    /// Set by `delete_all`; a writer that raced the purge must re-fetch
    /// the room entry instead of appending to this orphaned log
    purged: bool,
}

impl RoomLog {
    fn next_id(&mut self) -> MessageId {
        self.last_id += 1;
        MessageId::new(self.last_id)
    }
}

/// In-memory `MessageStore` implementation
///
/// Rooms are sharded across a `DashMap`; every mutation takes only the
/// target room's lock.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    rooms: DashMap<String, Arc<Mutex<RoomLog>>>,
}

impl MemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a new store wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn log_for(&self, room: &str) -> Arc<Mutex<RoomLog>> {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn existing_log(&self, room: &str) -> Option<Arc<Mutex<RoomLog>>> {
        self.rooms.get(room).map(|r| r.value().clone())
    }

    /// Number of rooms currently holding messages
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(
        &self,
        room: &str,
        sender: &Identity,
        body: String,
        kind: MessageKind,
    ) -> StoreResult<Message> {
        loop {
            let log = self.log_for(room);
            let mut log = log.lock().await;

            // Lost a race against delete_all: this log is no longer the
            // one registered for the room, start over on a fresh entry.
            if log.purged {
                continue;
            }

            let id = log.next_id();
            let message = Message::new(
                id,
                room,
                sender.id.clone(),
                sender.display_name.clone(),
                body,
                kind,
            );
            log.messages.push(message.clone());

            tracing::debug!(room = %room, id = %id, sender = %sender.id, "Message appended");

            return Ok(message);
        }
    }

    async fn history(&self, room: &str) -> StoreResult<Vec<Message>> {
        let Some(log) = self.existing_log(room) else {
            return Ok(Vec::new());
        };
        let log = log.lock().await;
        Ok(log.messages.clone())
    }

    async fn delete_one(&self, room: &str, id: MessageId) -> StoreResult<bool> {
        let Some(log) = self.existing_log(room) else {
            return Ok(false);
        };
        let mut log = log.lock().await;

        let before = log.messages.len();
        log.messages.retain(|m| m.id != id);
        let found = log.messages.len() < before;

        if found {
            tracing::debug!(room = %room, id = %id, "Message deleted");
        }

        Ok(found)
    }

    async fn delete_all(&self, room: &str) -> StoreResult<usize> {
        let Some((_, log)) = self.rooms.remove(room) else {
            return Ok(0);
        };
        let mut log = log.lock().await;
        log.purged = true;

        let count = log.messages.len();
        log.messages.clear();

        tracing::info!(room = %room, purged = count, "Room history purged");

        Ok(count)
    }

    async fn mark_room_seen(&self, room: &str) -> StoreResult<usize> {
        let Some(log) = self.existing_log(room) else {
            return Ok(0);
        };
        let mut log = log.lock().await;

        let changed = log
            .messages
            .iter_mut()
            .map(Message::mark_seen)
            .filter(|changed| *changed)
            .count();

        if changed > 0 {
            tracing::debug!(room = %room, changed = changed, "Seen watermark advanced");
        }

        Ok(changed)
    }
}
