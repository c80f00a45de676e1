//! Per-room serialization
//!
//! Every state-mutating operation on a room (append + broadcast, delete,
//! membership change) runs under that room's lock, so sessions observe
//! message broadcasts in id order and purge never overlaps a join. Rooms
//! contend only with themselves.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard over one room's mutations
pub type RoomGuard = OwnedMutexGuard<()>;

/// Sharded map of room name to its serialization lock
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoomLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for a room, creating it on first use
    pub async fn acquire(&self, room: &str) -> RoomGuard {
        let lock = self
            .locks
            .entry(room.to_string())
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Drop a room's lock entry once the room is gone
    ///
    /// Only removes the entry when nobody holds or awaits the lock; the
    /// strong count is checked under the shard lock, which `acquire` also
    /// needs, so the check cannot race a new acquisition.
    pub fn cleanup(&self, room: &str) {
        self.locks
            .remove_if(room, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of rooms with a live lock entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
