//! Join handler
//!
//! Registers the session in the presence registry, replays the room's
//! history to the joiner, and broadcasts the new presence snapshot.

use super::{HandlerError, HandlerResult, LeaveHandler};
use crate::connection::Connection;
use crate::protocol::{CloseCode, JoinPayload, ServerEvent};
use crate::server::GatewayState;
use roomcast_core::{DomainError, Session};
use std::sync::Arc;
use validator::Validate;

/// Handles `join` events
pub struct JoinHandler;

impl JoinHandler {
    /// Handle a `join` event
    ///
    /// Joining while already in a room leaves the old room first, with the
    /// full depart sequence (purge-on-empty included). History replay goes
    /// to the joiner only; the presence snapshot goes to the whole room,
    /// joiner included.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: JoinPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        payload
            .validate()
            .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;

        let identity = connection
            .identity()
            .await
            .ok_or(HandlerError::NotAuthenticated)?;

        // Detach from the previous room before taking the new room's lock;
        // the two rooms are never locked at once.
        LeaveHandler::depart(state, connection).await;

        let room = payload.room;
        let guard = state.engine().locks().acquire(&room).await;

        let session = Session::new(connection.session_id(), identity, &room);
        let joined = state
            .engine()
            .registry()
            .add_session(session)
            .map_err(|e| match e {
                DomainError::RegistryClosed => HandlerError::ShuttingDown,
                other => HandlerError::Domain(other),
            })?;

        connection.set_room(Some(room.clone())).await;

        tracing::info!(
            session_id = %joined.session.session_id,
            user_id = %joined.session.identity.id,
            room = %room,
            "Session joined room"
        );

        if joined.identity_online {
            state
                .engine()
                .profile_store()
                .set_online(&joined.session.identity.id)
                .await?;
        }

        // Backstop for a stale registration the depart above didn't cover
        if let Some(vacated) = joined.vacated_room {
            if let Err(e) = state.engine().lifecycle().on_room_emptied(&vacated).await {
                tracing::error!(room = %vacated, error = %e, "Failed to purge vacated room");
            }
        }

        // Replay goes only to the joiner; an empty room replays nothing
        // but still sends the (empty) history so the client can render.
        let history = state.engine().message_store().history(&room).await?;
        connection
            .send(ServerEvent::OldMessages(history))
            .await
            .map_err(|e| HandlerError::Internal(e.to_string()))?;

        let sessions = state.engine().registry().sessions_in_room(&room);
        let snapshot = ServerEvent::online_users(&sessions);
        state.connection_manager().send_to(&sessions, &snapshot);

        drop(guard);
        Ok(None)
    }
}
