//! Protocol events
//!
//! All traffic is JSON of the form `{"event": "...", "data": ...}`.
//! Inbound events dispatch through a single entry point per connection,
//! keeping validation and authorization centralized.

use roomcast_core::{Identity, Message, MessageId, MessageKind, Session, SessionId, TYPING_EXPIRY};
use serde::{Deserialize, Serialize};
use validator::Validate;

// === Inbound (client -> gateway) ===

/// Events a client may send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Present the identity token; must precede everything else
    Identify(IdentifyPayload),
    /// Join a room (implicitly leaves the current one)
    Join(JoinPayload),
    /// Persist and broadcast a message to the current room
    SendMessage(SendMessagePayload),
    /// Ephemeral typing signal for the current room
    Typing,
    /// Delete a single message from the current room
    DeleteMessage(DeleteMessagePayload),
    /// Advance the room-wide seen watermark
    Seen,
    /// Leave the current room, keeping the connection open
    LeaveRoom,
}

impl ClientEvent {
    /// Deserialize from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Name of the event for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identify(_) => "identify",
            Self::Join(_) => "join",
            Self::SendMessage(_) => "sendMessage",
            Self::Typing => "typing",
            Self::DeleteMessage(_) => "deleteMessage",
            Self::Seen => "seen",
            Self::LeaveRoom => "leaveRoom",
        }
    }
}

/// `identify` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Opaque identity token from the identity provider
    pub token: String,
}

/// `join` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JoinPayload {
    /// Room name; rooms exist purely by name
    #[validate(length(min = 1, max = 128))]
    pub room: String,
}

/// `sendMessage` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    #[validate(length(min = 1))]
    pub body: String,
    #[serde(default)]
    pub kind: MessageKind,
}

/// `deleteMessage` payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeleteMessagePayload {
    pub id: MessageId,
}

// === Outbound (gateway -> client) ===

/// Events the gateway sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Identify succeeded
    Ready(ReadyPayload),
    /// History replay, sent once to the joining session only
    OldMessages(Vec<Message>),
    /// A message was persisted and is now visible room-wide
    ReceiveMessage(Message),
    /// Presence snapshot, re-broadcast on every membership change
    OnlineUsers(Vec<RoomMember>),
    /// Someone else is typing; expires receiver-side
    Typing(TypingPayload),
    /// A message was removed
    MessageDeleted(DeleteMessagePayload),
    /// Room-wide seen watermark advanced
    Seen,
    /// The sender's own message could not be persisted; nothing was
    /// broadcast (reported to the originating session only)
    SendFailed { reason: String },
}

impl ServerEvent {
    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Presence snapshot event from registry sessions
    #[must_use]
    pub fn online_users(sessions: &[Session]) -> Self {
        Self::OnlineUsers(sessions.iter().map(RoomMember::from).collect())
    }

    /// Typing event with the receiver-side expiry window attached
    #[must_use]
    pub fn typing(sender_name: impl Into<String>) -> Self {
        Self::Typing(TypingPayload {
            sender_name: sender_name.into(),
            expires_in_ms: TYPING_EXPIRY.as_millis() as u64,
        })
    }
}

/// `ready` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub session_id: SessionId,
    pub identity: Identity,
}

/// One entry of the `onlineUsers` snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMember {
    pub identity: Identity,
    pub room: String,
}

impl From<&Session> for RoomMember {
    fn from(session: &Session) -> Self {
        Self {
            identity: session.identity.clone(),
            room: session.room.clone(),
        }
    }
}

/// `typing` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub sender_name: String,
    /// Receivers clear the indicator this many ms after the latest signal
    pub expires_in_ms: u64,
}
