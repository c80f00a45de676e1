//! Status tracker
//!
//! Applies the room-wide seen watermark. Deliberately coarse: rooms are
//! small (1:1 or small group), so "everything in this room is seen" is the
//! unit of acknowledgment, never individual message ids.

use roomcast_core::{MessageStore, StoreResult};
use std::sync::Arc;

/// Computes and applies delivered -> seen transitions
pub struct StatusTracker {
    store: Arc<dyn MessageStore>,
}

impl StatusTracker {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Advance every non-seen message in the room to seen
    ///
    /// Returns true iff anything changed; the gateway broadcasts the
    /// room-level `seen` notice only then, keeping repeated watermarks
    /// from producing duplicate broadcasts.
    pub async fn mark_room_seen(&self, room: &str) -> StoreResult<bool> {
        let changed = self.store.mark_room_seen(room).await?;

        if changed > 0 {
            tracing::debug!(room = %room, changed = changed, "Room marked seen");
        }

        Ok(changed > 0)
    }
}

impl std::fmt::Debug for StatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTracker").finish_non_exhaustive()
    }
}
