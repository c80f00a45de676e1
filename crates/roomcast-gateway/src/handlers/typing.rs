//! Typing handler
//!
//! Fire-and-forget: never persisted, never echoed back to the sender, and
//! expiry is handled entirely by the receivers.

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, ServerEvent};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles `typing` events
pub struct TypingHandler;

impl TypingHandler {
    /// Handle a `typing` event
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
    ) -> HandlerResult<Option<CloseCode>> {
        if !connection.is_authenticated().await {
            return Err(HandlerError::NotAuthenticated);
        }

        // Not joined anywhere: nothing to relay
        let Some(session) = state.engine().registry().session(&connection.session_id()) else {
            return Ok(None);
        };

        let signal = state.engine().typing().signal(&session);
        let sessions = state.engine().registry().sessions_in_room(&signal.room);

        state.connection_manager().send_to_except(
            &sessions,
            connection.session_id(),
            &ServerEvent::typing(signal.sender_name),
        );

        Ok(None)
    }
}
