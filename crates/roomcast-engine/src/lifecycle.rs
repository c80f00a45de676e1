//! Room lifecycle manager
//!
//! Rooms have no identity beyond their name and no retention once
//! unoccupied: when the presence registry reports a room's last session
//! gone, the entire history is discarded. A later join with the same name
//! starts from empty history.

use roomcast_core::{MessageStore, StoreResult};
use std::sync::Arc;

/// Purges room history when the room empties
pub struct RoomLifecycle {
    store: Arc<dyn MessageStore>,
}

impl RoomLifecycle {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Invoked on the 1 -> 0 active-session transition of a room
    ///
    /// The caller (gateway cleanup path) drives this from the registry's
    /// `Departure::room_emptied` flag, which fires exactly once per
    /// transition, so the purge cannot double-fire.
    pub async fn on_room_emptied(&self, room: &str) -> StoreResult<usize> {
        let purged = self.store.delete_all(room).await?;

        tracing::info!(room = %room, purged = purged, "Room emptied, history discarded");

        Ok(purged)
    }
}

impl std::fmt::Debug for RoomLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomLifecycle").finish_non_exhaustive()
    }
}
