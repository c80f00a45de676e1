//! Leave handler and the shared depart path
//!
//! Explicit `leaveRoom`, a re-`join`, and abrupt disconnects all converge
//! on the same depart sequence: deregister under the room lock, purge the
//! room's history iff it emptied, otherwise re-broadcast presence.

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, ServerEvent};
use crate::server::GatewayState;
use chrono::Utc;
use std::sync::Arc;

/// Handles `leaveRoom` events
pub struct LeaveHandler;

impl LeaveHandler {
    /// Handle a `leaveRoom` event
    ///
    /// Leaving when no room is bound is a no-op; the connection stays open
    /// either way.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
    ) -> HandlerResult<Option<CloseCode>> {
        Self::depart(state, connection).await;
        Ok(None)
    }

    /// Deregister the connection's session from its current room
    ///
    /// Runs entirely under the room's lock so the membership change, the
    /// purge-on-empty, and the presence re-broadcast are one atomic step
    /// relative to concurrent sends in the same room. Storage failures are
    /// logged rather than propagated: by the time they can occur the
    /// session is already out of the registry, and this path must also
    /// complete for dying connections.
    pub async fn depart(state: &GatewayState, connection: &Arc<Connection>) {
        let Some(room) = connection.room().await else {
            return;
        };

        let guard = state.engine().locks().acquire(&room).await;

        let departure = state
            .engine()
            .registry()
            .remove_session(&connection.session_id());
        connection.set_room(None).await;

        if let Some(departure) = departure {
            tracing::info!(
                session_id = %departure.session.session_id,
                user_id = %departure.session.identity.id,
                room = %room,
                room_emptied = departure.room_emptied,
                "Session departed room"
            );

            if departure.identity_offline {
                if let Err(e) = state
                    .engine()
                    .profile_store()
                    .set_offline(&departure.session.identity.id, Utc::now())
                    .await
                {
                    tracing::error!(
                        user_id = %departure.session.identity.id,
                        error = %e,
                        "Failed to record offline status"
                    );
                }
            }

            if departure.room_emptied {
                match state.engine().lifecycle().on_room_emptied(&room).await {
                    Ok(purged) => {
                        tracing::info!(room = %room, purged = purged, "Emptied room purged");
                    }
                    Err(e) => {
                        tracing::error!(room = %room, error = %e, "Failed to purge emptied room");
                    }
                }
            } else {
                let sessions = state.engine().registry().sessions_in_room(&room);
                let snapshot = ServerEvent::online_users(&sessions);
                state.connection_manager().send_to(&sessions, &snapshot);
            }
        }

        drop(guard);
        state.engine().locks().cleanup(&room);
    }
}
