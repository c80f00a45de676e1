//! In-memory profile presence store
//!
//! Holds the only two profile fields the engine writes: `isOnline` and
//! `lastSeen`. Everything else about a profile belongs to the external
//! identity/profile collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use roomcast_core::{Profile, ProfileStore, StoreResult, UserId};
use std::sync::Arc;

/// In-memory `ProfileStore` implementation
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<UserId, Profile>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    /// Create a new store wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn set_online(&self, user_id: &UserId) -> StoreResult<()> {
        self.profiles.insert(user_id.clone(), Profile::online());
        tracing::debug!(user_id = %user_id, "Profile set online");
        Ok(())
    }

    async fn set_offline(&self, user_id: &UserId, last_seen: DateTime<Utc>) -> StoreResult<()> {
        self.profiles
            .insert(user_id.clone(), Profile::offline(last_seen));
        tracing::debug!(user_id = %user_id, last_seen = %last_seen, "Profile set offline");
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> StoreResult<Option<Profile>> {
        Ok(self.profiles.get(user_id).map(|p| *p.value()))
    }
}
