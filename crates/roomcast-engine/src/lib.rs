//! # roomcast-engine
//!
//! The room engine: presence registry, room lifecycle, status tracking,
//! typing relay, and per-room serialization. The gateway routes inbound
//! events to these components and fans their outputs back out to the
//! sessions the registry reports.

mod context;
mod lifecycle;
mod locks;
mod presence;
mod status;
mod typing;

pub use context::{EngineContext, EngineContextBuilder, MissingDependency};
pub use lifecycle::RoomLifecycle;
pub use locks::{RoomGuard, RoomLocks};
pub use presence::{Departure, Joined, PresenceRegistry};
pub use status::StatusTracker;
pub use typing::{TypingIndicator, TypingRelay};
