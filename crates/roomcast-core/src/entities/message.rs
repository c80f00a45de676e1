//! Message entity - one persisted room message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::UserId;

/// Per-room message id
///
/// Assigned by the message store, strictly increasing within a room. The id
/// is the total order used for history replay and deletion lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// First id assigned in any room
    pub const FIRST: MessageId = MessageId(1);

    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The id that follows this one in the same room
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

/// Delivery status
///
/// A message is `Delivered` the instant it is persisted; there is no
/// client-observable "sent" state. `Seen` is applied room-wide by the
/// status tracker, never per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Delivered,
    Seen,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub room: String,
    pub sender: UserId,
    pub sender_name: String,
    pub body: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
}

impl Message {
    /// Create a freshly persisted message (status starts at `Delivered`)
    pub fn new(
        id: MessageId,
        room: impl Into<String>,
        sender: UserId,
        sender_name: impl Into<String>,
        body: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id,
            room: room.into(),
            sender,
            sender_name: sender_name.into(),
            body: body.into(),
            kind,
            created_at: Utc::now(),
            status: MessageStatus::Delivered,
        }
    }

    /// Check whether the room-wide seen watermark has passed this message
    #[inline]
    pub fn is_seen(&self) -> bool {
        self.status == MessageStatus::Seen
    }

    /// Advance this message to `Seen`; returns false if already there
    pub fn mark_seen(&mut self) -> bool {
        if self.status == MessageStatus::Seen {
            return false;
        }
        self.status = MessageStatus::Seen;
        true
    }

    /// Check if message body is blank
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}
