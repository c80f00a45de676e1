//! Engine context - dependency container for the room engine
//!
//! Holds the presence registry, store ports, lifecycle manager, status
//! tracker, typing relay, and the per-room locks. The gateway owns one of
//! these and routes every inbound event through it.

use std::sync::Arc;

use roomcast_core::{MessageStore, ProfileStore};

use crate::lifecycle::RoomLifecycle;
use crate::locks::RoomLocks;
use crate::presence::PresenceRegistry;
use crate::status::StatusTracker;
use crate::typing::TypingRelay;

/// Engine context containing all room-engine dependencies
#[derive(Clone)]
pub struct EngineContext {
    registry: Arc<PresenceRegistry>,
    message_store: Arc<dyn MessageStore>,
    profile_store: Arc<dyn ProfileStore>,
    lifecycle: Arc<RoomLifecycle>,
    status: Arc<StatusTracker>,
    typing: TypingRelay,
    locks: Arc<RoomLocks>,
}

impl EngineContext {
    /// Start building an engine context
    #[must_use]
    pub fn builder() -> EngineContextBuilder {
        EngineContextBuilder::default()
    }

    /// The presence registry
    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// The message store port
    pub fn message_store(&self) -> &dyn MessageStore {
        self.message_store.as_ref()
    }

    /// The profile store port
    pub fn profile_store(&self) -> &dyn ProfileStore {
        self.profile_store.as_ref()
    }

    /// The room lifecycle manager
    pub fn lifecycle(&self) -> &RoomLifecycle {
        &self.lifecycle
    }

    /// The status tracker
    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// The typing relay
    pub fn typing(&self) -> TypingRelay {
        self.typing
    }

    /// The per-room serialization locks
    pub fn locks(&self) -> &RoomLocks {
        &self.locks
    }

    /// Begin shutdown: refuse new joins and drain every session
    ///
    /// Each drained room that emptied is purged, so the process exits with
    /// no retained history.
    pub async fn shutdown(&self) {
        self.registry.close();

        for departure in self.registry.drain() {
            if departure.identity_offline {
                if let Err(e) = self
                    .profile_store
                    .set_offline(&departure.session.identity.id, chrono::Utc::now())
                    .await
                {
                    tracing::warn!(
                        user_id = %departure.session.identity.id,
                        error = %e,
                        "Offline write on shutdown failed"
                    );
                }
            }
            if departure.room_emptied {
                if let Err(e) = self.lifecycle.on_room_emptied(&departure.session.room).await {
                    tracing::warn!(room = %departure.session.room, error = %e, "Purge on shutdown failed");
                }
            }
        }

        tracing::info!("Engine drained");
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// A required dependency was not provided to the builder
#[derive(Debug, thiserror::Error)]
#[error("Missing engine dependency: {0}")]
pub struct MissingDependency(pub &'static str);

/// Builder for `EngineContext`
#[derive(Default)]
pub struct EngineContextBuilder {
    message_store: Option<Arc<dyn MessageStore>>,
    profile_store: Option<Arc<dyn ProfileStore>>,
}

impl EngineContextBuilder {
    /// Set the message store port
    #[must_use]
    pub fn message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.message_store = Some(store);
        self
    }

    /// Set the profile store port
    #[must_use]
    pub fn profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profile_store = Some(store);
        self
    }

    /// Assemble the context
    pub fn build(self) -> Result<EngineContext, MissingDependency> {
        let message_store = self
            .message_store
            .ok_or(MissingDependency("message_store"))?;
        let profile_store = self
            .profile_store
            .ok_or(MissingDependency("profile_store"))?;

        Ok(EngineContext {
            registry: PresenceRegistry::new_shared(),
            lifecycle: Arc::new(RoomLifecycle::new(message_store.clone())),
            status: Arc::new(StatusTracker::new(message_store.clone())),
            typing: TypingRelay::new(),
            locks: Arc::new(RoomLocks::new()),
            message_store,
            profile_store,
        })
    }
}
