//! Typing signal relay
//!
//! Typing is fire-and-forget: no persistence, no acknowledgment, no
//! explicit stop event. The relay only shapes the ephemeral event; expiry
//! is the receiver's job, restarted on every fresh signal.

use roomcast_core::{Session, TypingEvent, TYPING_EXPIRY};
use tokio::time::Instant;

/// Builds typing events for broadcast to the rest of a room
#[derive(Debug, Default, Clone, Copy)]
pub struct TypingRelay;

impl TypingRelay {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Shape the typing signal for a session's room
    pub fn signal(&self, session: &Session) -> TypingEvent {
        TypingEvent::new(&session.room, &session.identity.display_name)
    }
}

/// Receiver-side typing indicator
///
/// Tracks the most recent typing signal for one room and reports it as
/// active only within `TYPING_EXPIRY` of that receipt. Clients clear the
/// indicator by polling `active_sender`; no clear event ever arrives.
#[derive(Debug, Default)]
pub struct TypingIndicator {
    current: Option<(String, Instant)>,
}

impl TypingIndicator {
    #[must_use]
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Record a typing signal, restarting the expiry window
    pub fn observe(&mut self, sender_name: impl Into<String>) {
        self.current = Some((sender_name.into(), Instant::now()));
    }

    /// Who is typing right now, if the window has not lapsed
    pub fn active_sender(&mut self) -> Option<&str> {
        let lapsed = self
            .current
            .as_ref()
            .is_none_or(|(_, at)| at.elapsed() > TYPING_EXPIRY);
        if lapsed {
            self.current = None;
        }
        self.current.as_ref().map(|(name, _)| name.as_str())
    }
}
