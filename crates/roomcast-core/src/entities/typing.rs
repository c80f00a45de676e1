//! Typing event - ephemeral, never persisted

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a typing signal stays valid without a refresh
///
/// Receivers must treat an indicator as expired this long after the most
/// recent signal; the relay never sends an explicit "stopped typing" event.
pub const TYPING_EXPIRY: Duration = Duration::from_millis(1200);

/// Ephemeral typing signal relayed to the other sessions in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingEvent {
    pub room: String,
    pub sender_name: String,
}

impl TypingEvent {
    pub fn new(room: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            sender_name: sender_name.into(),
        }
    }
}
