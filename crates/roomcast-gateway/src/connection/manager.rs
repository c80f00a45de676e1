//! Connection manager
//!
//! Owns all active WebSocket connections. Fan-out targets are always the
//! presence registry's session snapshot, resolved here to live channels at
//! emit time.

use super::Connection;
use crate::protocol::ServerEvent;
use dashmap::DashMap;
use roomcast_core::{Session, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections
///
/// Uses `DashMap` for concurrent access to connection state.
pub struct ConnectionManager {
    /// Active connections by session id
    connections: DashMap<SessionId, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(
        &self,
        session_id: SessionId,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id, sender);
        self.connections.insert(session_id, connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection
    pub fn remove_connection(&self, session_id: &SessionId) {
        if self.connections.remove(session_id).is_some() {
            tracing::debug!(session_id = %session_id, "Connection removed");
        }
    }

    /// Get a connection by session id
    pub fn get_connection(&self, session_id: &SessionId) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Send an event to every listed session
    ///
    /// Sessions whose connection has already gone away are skipped; their
    /// own cleanup path is responsible for deregistering them. Fan-out is
    /// non-blocking: a receiver whose outbound buffer is full loses the
    /// event rather than stalling the sender, which may be holding the
    /// room's lock.
    pub fn send_to(&self, sessions: &[Session], event: &ServerEvent) -> usize {
        let mut sent = 0;

        for session in sessions {
            if let Some(conn) = self.get_connection(&session.session_id) {
                match conn.try_send(event.clone()) {
                    Ok(()) => sent += 1,
                    Err(e) => {
                        tracing::warn!(
                            session_id = %session.session_id,
                            error = %e,
                            "Dropped event for slow or gone receiver"
                        );
                    }
                }
            }
        }

        tracing::trace!(targets = sessions.len(), sent = sent, "Fan-out complete");

        sent
    }

    /// Send an event to every listed session except one (typing relays
    /// never echo back to the sender)
    pub fn send_to_except(
        &self,
        sessions: &[Session],
        exclude: SessionId,
        event: &ServerEvent,
    ) -> usize {
        let mut sent = 0;

        for session in sessions {
            if session.session_id == exclude {
                continue;
            }
            if let Some(conn) = self.get_connection(&session.session_id) {
                if conn.try_send(event.clone()).is_ok() {
                    sent += 1;
                }
            }
        }

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &SessionId) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
