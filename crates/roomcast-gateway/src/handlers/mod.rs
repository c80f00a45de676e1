//! Event handlers
//!
//! Handles incoming client events based on their event tag.

mod error;
mod identify;
mod join;
mod leave;
mod message;
mod seen;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use identify::IdentifyHandler;
pub use join::JoinHandler;
pub use leave::LeaveHandler;
pub use message::{DeleteMessageHandler, SendMessageHandler};
pub use seen::SeenHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{ClientEvent, CloseCode};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client events to appropriate handlers
pub struct EventDispatcher;

impl EventDispatcher {
    /// Handle an incoming client event
    ///
    /// Everything except `identify` requires a verified identity first;
    /// an unauthenticated violation closes the connection.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<Option<CloseCode>> {
        if !matches!(event, ClientEvent::Identify(_)) && !connection.is_authenticated().await {
            tracing::warn!(
                session_id = %connection.session_id(),
                event = event.name(),
                "Event before identify"
            );
            return Ok(Some(CloseCode::NotAuthenticated));
        }

        match event {
            ClientEvent::Identify(payload) => {
                IdentifyHandler::handle(state, connection, payload).await
            }
            ClientEvent::Join(payload) => JoinHandler::handle(state, connection, payload).await,
            ClientEvent::SendMessage(payload) => {
                SendMessageHandler::handle(state, connection, payload).await
            }
            ClientEvent::Typing => TypingHandler::handle(state, connection).await,
            ClientEvent::DeleteMessage(payload) => {
                DeleteMessageHandler::handle(state, connection, payload).await
            }
            ClientEvent::Seen => SeenHandler::handle(state, connection).await,
            ClientEvent::LeaveRoom => LeaveHandler::handle(state, connection).await,
        }
    }
}
