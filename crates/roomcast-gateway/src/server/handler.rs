//! WebSocket handler
//!
//! Handles WebSocket connections and event processing.

use crate::connection::{Connection, ConnectionState};
use crate::handlers::{EventDispatcher, LeaveHandler};
use crate::protocol::{ClientEvent, CloseCode, ServerEvent};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use roomcast_core::SessionId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
///
/// A single loop owns the socket: inbound frames are dispatched inline,
/// outbound events arrive over the connection's channel. This keeps the
/// sink available for sending a proper close frame when a dispatch error
/// terminates the connection.
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = SessionId::generate();

    // Channel for outgoing events
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config().rooms.send_buffer);

    // Register connection
    let connection = state.connection_manager().add_connection(session_id, tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let mut close_code: Option<CloseCode> = None;

    loop {
        tokio::select! {
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(code) = handle_text_frame(&state, &connection, &text).await {
                            close_code = Some(code);
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(session_id = %session_id, "Binary frames not supported");
                        close_code = Some(CloseCode::DecodeError);
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Pong replies are handled by axum
                        tracing::trace!(session_id = %session_id, "Ping/pong frame");
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(session_id = %session_id, "Client closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event.to_json() {
                    Ok(json) => {
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            tracing::warn!(session_id = %session_id, "Failed to send event");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            session_id = %session_id,
                            error = %e,
                            "Event serialization failed"
                        );
                    }
                }
            }
        }
    }

    if let Some(code) = close_code {
        tracing::debug!(session_id = %session_id, close_code = ?code, "Closing with code");
        let _ = ws_sink
            .send(Message::Close(Some(CloseFrame {
                code: code.as_u16(),
                reason: code.description().into(),
            })))
            .await;
    }
    let _ = ws_sink.close().await;

    cleanup_connection(&state, &connection).await;
}

/// Handle a text frame from the client
///
/// Frames that fail to decode are dropped without affecting the
/// connection; dispatch errors map to a close code.
async fn handle_text_frame(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let event = match ClientEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Undecodable frame dropped"
            );
            return Ok(());
        }
    };

    tracing::trace!(
        session_id = %connection.session_id(),
        event = event.name(),
        "Received event"
    );

    match EventDispatcher::dispatch(state, connection, event).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Handler error"
            );
            Err(e.to_close_code().unwrap_or(CloseCode::UnknownError))
        }
    }
}

/// Clean up a connection on disconnect
///
/// Identical to an explicit `leaveRoom` followed by deregistration:
/// abrupt disconnects get the full depart sequence, purge-on-empty
/// included.
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(session_id = %connection.session_id(), "Cleaning up connection");

    connection.set_state(ConnectionState::Disconnecting).await;

    LeaveHandler::depart(state, connection).await;

    state
        .connection_manager()
        .remove_connection(&connection.session_id());
    connection.set_state(ConnectionState::Disconnected).await;
}
