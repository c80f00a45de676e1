//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its state.

use crate::protocol::ServerEvent;
use roomcast_core::{Identity, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Connection established, waiting for identify
    Connecting,
    /// Successfully authenticated
    Connected,
    /// Connection is being closed
    Disconnecting,
    /// Connection is closed
    Disconnected,
}

/// A single WebSocket connection
///
/// The session id is fixed for the connection's lifetime; identity and
/// room binding change as the client identifies and joins.
pub struct Connection {
    /// Unique session id, shared with the presence registry
    session_id: SessionId,

    /// Verified identity (None until identify)
    identity: RwLock<Option<Identity>>,

    /// Room this connection is joined to (None until join)
    room: RwLock<Option<String>>,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Channel to send events to the WebSocket write task
    sender: mpsc::Sender<ServerEvent>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(session_id: SessionId, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            identity: RwLock::new(None),
            room: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            created_at: Instant::now(),
        })
    }

    /// Get the session id
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Get the verified identity (if authenticated)
    pub async fn identity(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    /// Set the identity (on successful identify)
    pub async fn set_identity(&self, identity: Identity) {
        *self.identity.write().await = Some(identity);
    }

    /// Check if the connection is authenticated
    pub async fn is_authenticated(&self) -> bool {
        self.identity.read().await.is_some()
    }

    /// Get the joined room, if any
    pub async fn room(&self) -> Option<String> {
        self.room.read().await.clone()
    }

    /// Bind or unbind the room
    pub async fn set_room(&self, room: Option<String>) {
        *self.room.write().await = room;
    }

    /// Get the current state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Set the connection state
    pub async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Send an event to this connection
    pub async fn send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event).await
    }

    /// Try to send an event (non-blocking)
    pub fn try_send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::TrySendError<ServerEvent>> {
        self.sender.try_send(event)
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
