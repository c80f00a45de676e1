//! Storage ports for messages and profile presence fields

use async_trait::async_trait;

use crate::entities::{Identity, Message, MessageId, MessageKind, Profile, UserId};
use crate::error::DomainError;
use chrono::{DateTime, Utc};

/// Result type for store operations
pub type StoreResult<T> = Result<T, DomainError>;

// ============================================================================
// Message Store
// ============================================================================

/// Durable append-only record of messages per room
///
/// Implementations must serialize mutations per room: ids are strictly
/// increasing within a room even under concurrent `append` calls, with ties
/// broken by arrival order at the store, never by client-supplied input.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message: assigns the next id and `created_at`, sets
    /// status `delivered`, and returns the stored record for broadcast.
    async fn append(
        &self,
        room: &str,
        sender: &Identity,
        body: String,
        kind: MessageKind,
    ) -> StoreResult<Message>;

    /// Full history for a room, oldest first. Empty for rooms that were
    /// never written or have been fully vacated.
    async fn history(&self, room: &str) -> StoreResult<Vec<Message>>;

    /// Delete a single message. Returns whether it existed.
    async fn delete_one(&self, room: &str, id: MessageId) -> StoreResult<bool>;

    /// Purge every message in a room. Returns how many were removed.
    /// Used only by the room lifecycle manager.
    async fn delete_all(&self, room: &str) -> StoreResult<usize>;

    /// Advance the room-wide seen watermark: every message with status
    /// `delivered` becomes `seen`. Returns how many changed (0 means the
    /// call was a no-op and nothing should be broadcast).
    async fn mark_room_seen(&self, room: &str) -> StoreResult<usize>;
}

// ============================================================================
// Profile Store
// ============================================================================

/// The only profile fields the engine writes: `isOnline` and `lastSeen`
///
/// Everything else about a profile (credentials, avatar blobs) belongs to
/// the external identity/profile collaborators.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Mark an identity online (first session appeared)
    async fn set_online(&self, user_id: &UserId) -> StoreResult<()>;

    /// Mark an identity offline with its last-seen timestamp
    /// (last session disappeared)
    async fn set_offline(&self, user_id: &UserId, last_seen: DateTime<Utc>) -> StoreResult<()>;

    /// Read back the presence fields, if the identity has ever been seen
    async fn get(&self, user_id: &UserId) -> StoreResult<Option<Profile>>;
}
