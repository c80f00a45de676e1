//! Message handlers
//!
//! Send and delete both hold the room lock across the store mutation and
//! the broadcast, so every session in a room observes message events in
//! the same order the store applied them.

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, DeleteMessagePayload, SendMessagePayload, ServerEvent};
use crate::server::GatewayState;
use roomcast_core::DomainError;
use std::sync::Arc;
use validator::Validate;

/// Handles `sendMessage` events
pub struct SendMessageHandler;

impl SendMessageHandler {
    /// Handle a `sendMessage` event
    ///
    /// Rejections (empty body, oversized body, storage failure) go back to
    /// the originator as `sendFailed`; nothing is broadcast and the
    /// connection stays open.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let identity = connection
            .identity()
            .await
            .ok_or(HandlerError::NotAuthenticated)?;

        let Some(room) = connection.room().await else {
            tracing::debug!(
                session_id = %connection.session_id(),
                "sendMessage outside a room ignored"
            );
            return Ok(None);
        };

        if payload.validate().is_err() || payload.body.trim().is_empty() {
            Self::reject(connection, &DomainError::EmptyBody).await;
            return Ok(None);
        }

        let max_len = state.config().rooms.max_body_len;
        if payload.body.chars().count() > max_len {
            Self::reject(connection, &DomainError::ContentTooLong { max: max_len }).await;
            return Ok(None);
        }

        let guard = state.engine().locks().acquire(&room).await;

        match state
            .engine()
            .message_store()
            .append(&room, &identity, payload.body, payload.kind)
            .await
        {
            Ok(message) => {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    room = %room,
                    message_id = %message.id,
                    "Message persisted"
                );

                let sessions = state.engine().registry().sessions_in_room(&room);
                state
                    .connection_manager()
                    .send_to(&sessions, &ServerEvent::ReceiveMessage(message));
            }
            Err(e) => {
                tracing::error!(
                    session_id = %connection.session_id(),
                    room = %room,
                    error = %e,
                    "Message persistence failed"
                );
                Self::reject(connection, &e).await;
            }
        }

        drop(guard);
        Ok(None)
    }

    /// Report a rejection to the originator only
    ///
    /// Storage internals never reach the wire; validation errors do, so the
    /// client can tell the user what to change.
    async fn reject(connection: &Arc<Connection>, error: &DomainError) {
        let reason = if error.is_storage() {
            "message could not be stored".to_string()
        } else {
            error.to_string()
        };
        connection
            .send(ServerEvent::SendFailed { reason })
            .await
            .ok();
    }
}

/// Handles `deleteMessage` events
pub struct DeleteMessageHandler;

impl DeleteMessageHandler {
    /// Handle a `deleteMessage` event
    ///
    /// Deleting an id that no longer exists is a silent no-op; a second
    /// delete for the same id broadcasts nothing.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: DeleteMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if !connection.is_authenticated().await {
            return Err(HandlerError::NotAuthenticated);
        }

        let Some(room) = connection.room().await else {
            tracing::debug!(
                session_id = %connection.session_id(),
                "deleteMessage outside a room ignored"
            );
            return Ok(None);
        };

        let guard = state.engine().locks().acquire(&room).await;

        let removed = state
            .engine()
            .message_store()
            .delete_one(&room, payload.id)
            .await?;

        if removed {
            tracing::debug!(
                session_id = %connection.session_id(),
                room = %room,
                message_id = %payload.id,
                "Message deleted"
            );

            let sessions = state.engine().registry().sessions_in_room(&room);
            state
                .connection_manager()
                .send_to(&sessions, &ServerEvent::MessageDeleted(payload));
        }

        drop(guard);
        Ok(None)
    }
}
