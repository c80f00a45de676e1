//! Session entity - one authenticated connection bound to a room

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::Identity;

/// Unique id for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh session id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A session: one live connection joined to exactly one room
///
/// Created by the presence registry on join and owned by it until the
/// connection leaves or drops. An identity may hold any number of
/// concurrent sessions, each tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: SessionId,
    pub identity: Identity,
    pub room: String,
    pub connected_at: DateTime<Utc>,
}

impl Session {
    /// Create a session bound to `room`
    pub fn new(session_id: SessionId, identity: Identity, room: impl Into<String>) -> Self {
        Self {
            session_id,
            identity,
            room: room.into(),
            connected_at: Utc::now(),
        }
    }
}
