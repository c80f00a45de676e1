//! Presence registry
//!
//! The single source of truth for "who is here now". Sessions are indexed
//! by room for O(room size) fan-out and by identity for the online/offline
//! profile side effects, using `DashMap` for room-level contention.

use dashmap::DashMap;
use roomcast_core::{DomainError, Session, SessionId, UserId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of registering a session
#[derive(Debug, Clone)]
pub struct Joined {
    /// The registered session
    pub session: Session,
    /// Room the session previously occupied, if this was a re-join that
    /// left it empty (the caller must run the lifecycle purge for it)
    pub vacated_room: Option<String>,
    /// True when this is the identity's first live session anywhere
    /// (drives the profile "online" write)
    pub identity_online: bool,
}

/// Result of deregistering a session
#[derive(Debug, Clone)]
pub struct Departure {
    /// The removed session
    pub session: Session,
    /// True iff the room's active-session count transitioned 1 -> 0;
    /// the sole trigger for the room lifecycle manager
    pub room_emptied: bool,
    /// True when the identity has no other live session anywhere
    /// (drives the profile "offline" write)
    pub identity_offline: bool,
}

/// In-memory mapping of room -> active sessions
///
/// A session appears in exactly one room's set at a time; registering an
/// already-registered session first detaches the stale registration.
pub struct PresenceRegistry {
    /// All live sessions by id
    sessions: DashMap<SessionId, Session>,

    /// Room name to session ids
    rooms: DashMap<String, HashSet<SessionId>>,

    /// Identity to session ids (an identity may hold many sessions)
    identities: DashMap<UserId, HashSet<SessionId>>,

    /// Set on shutdown; no new joins accepted once true
    closed: AtomicBool,
}

impl PresenceRegistry {
    /// Create a new, empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            rooms: DashMap::new(),
            identities: DashMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a session in its room
    ///
    /// Idempotent re-join: a stale registration under the same session id
    /// is removed first, and if that leaves the old room empty the caller
    /// must purge it (`Joined::vacated_room`).
    pub fn add_session(&self, session: Session) -> Result<Joined, DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::RegistryClosed);
        }

        // Detach a stale registration for this connection, if any
        let vacated_room = self
            .remove_session(&session.session_id)
            .filter(|d| d.room_emptied)
            .map(|d| d.session.room);

        let identity_online = {
            let mut sessions = self
                .identities
                .entry(session.identity.id.clone())
                .or_default();
            let first = sessions.is_empty();
            sessions.insert(session.session_id);
            first
        };

        self.rooms
            .entry(session.room.clone())
            .or_default()
            .insert(session.session_id);
        self.sessions.insert(session.session_id, session.clone());

        tracing::debug!(
            session_id = %session.session_id,
            user_id = %session.identity.id,
            room = %session.room,
            "Session registered"
        );

        Ok(Joined {
            session,
            vacated_room,
            identity_online,
        })
    }

    /// Deregister a session
    ///
    /// Returns `None` when the session was never registered (a connection
    /// that never joined produces no room-side effects). Emptiness is
    /// computed inside the room entry's critical section so the 1 -> 0
    /// transition is reported exactly once.
    pub fn remove_session(&self, session_id: &SessionId) -> Option<Departure> {
        let (_, session) = self.sessions.remove(session_id)?;

        let mut room_emptied = false;
        if let Some(mut members) = self.rooms.get_mut(&session.room) {
            members.remove(session_id);
            room_emptied = members.is_empty();
        }
        if room_emptied {
            // Re-checked under the shard lock: a concurrent join wins
            self.rooms.remove_if(&session.room, |_, s| s.is_empty());
        }

        let mut identity_offline = false;
        if let Some(mut sessions) = self.identities.get_mut(&session.identity.id) {
            sessions.remove(session_id);
            identity_offline = sessions.is_empty();
        }
        if identity_offline {
            self.identities
                .remove_if(&session.identity.id, |_, s| s.is_empty());
        }

        tracing::debug!(
            session_id = %session_id,
            room = %session.room,
            room_emptied = room_emptied,
            "Session deregistered"
        );

        Some(Departure {
            session,
            room_emptied,
            identity_offline,
        })
    }

    /// Look up a session by id
    pub fn session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Snapshot of the sessions currently in a room
    ///
    /// Computed fresh on every call; fan-out targets and `onlineUsers`
    /// views are never cached.
    pub fn sessions_in_room(&self, room: &str) -> Vec<Session> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|sid| self.sessions.get(sid).map(|s| s.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether a room has no active sessions
    pub fn is_room_empty(&self, room: &str) -> bool {
        self.rooms.get(room).is_none_or(|members| members.is_empty())
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of rooms with at least one session
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Stop accepting joins (shutdown has begun)
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("Presence registry closed to new joins");
    }

    /// Whether the registry has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Remove every session through the normal departure path
    ///
    /// Used on shutdown after `close()`; returns the departures so the
    /// caller can run purges and profile writes.
    pub fn drain(&self) -> Vec<Departure> {
        let ids: Vec<SessionId> = self.sessions.iter().map(|s| *s.key()).collect();
        ids.iter()
            .filter_map(|sid| self.remove_session(sid))
            .collect()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("sessions", &self.sessions.len())
            .field("rooms", &self.rooms.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
