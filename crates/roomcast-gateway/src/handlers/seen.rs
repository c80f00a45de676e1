//! Seen handler
//!
//! Advances the room-wide seen watermark. Idempotent: a watermark that
//! moves nothing broadcasts nothing.

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, ServerEvent};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles `seen` events
pub struct SeenHandler;

impl SeenHandler {
    /// Handle a `seen` event
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
    ) -> HandlerResult<Option<CloseCode>> {
        if !connection.is_authenticated().await {
            return Err(HandlerError::NotAuthenticated);
        }

        let Some(room) = connection.room().await else {
            tracing::debug!(
                session_id = %connection.session_id(),
                "seen outside a room ignored"
            );
            return Ok(None);
        };

        let guard = state.engine().locks().acquire(&room).await;

        let changed = state.engine().status().mark_room_seen(&room).await?;

        if changed {
            tracing::debug!(room = %room, "Seen watermark advanced");

            let sessions = state.engine().registry().sessions_in_room(&room);
            state.connection_manager().send_to(&sessions, &ServerEvent::Seen);
        }

        drop(guard);
        Ok(None)
    }
}
