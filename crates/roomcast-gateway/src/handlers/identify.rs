//! Identify handler
//!
//! First event on every connection: verifies the identity token and binds
//! the verified identity to the connection.

use super::{HandlerError, HandlerResult};
use crate::connection::{Connection, ConnectionState};
use crate::protocol::{CloseCode, IdentifyPayload, ReadyPayload, ServerEvent};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles `identify` events
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Handle an `identify` event
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: IdentifyPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated().await {
            tracing::warn!(
                session_id = %connection.session_id(),
                "Client sent identify while already authenticated"
            );
            return Ok(Some(CloseCode::AlreadyAuthenticated));
        }

        // Accept "Bearer <token>" as well as the bare token
        let token = payload
            .token
            .strip_prefix("Bearer ")
            .unwrap_or(&payload.token);

        let identity = state.verifier().verify(token).map_err(|e| {
            tracing::debug!(session_id = %connection.session_id(), error = %e, "Token verification failed");
            HandlerError::AuthenticationFailed(e.to_string())
        })?;

        connection.set_identity(identity.clone()).await;
        connection.set_state(ConnectionState::Connected).await;

        tracing::info!(
            session_id = %connection.session_id(),
            user_id = %identity.id,
            "Connection authenticated"
        );

        connection
            .send(ServerEvent::Ready(ReadyPayload {
                session_id: connection.session_id(),
                identity,
            }))
            .await
            .map_err(|e| HandlerError::Internal(e.to_string()))?;

        Ok(None)
    }
}
