//! # roomcast-store
//!
//! In-process implementations of the store ports defined in `roomcast-core`.
//! Room history is deliberately ephemeral (purged when a room empties), so
//! the message log lives in memory behind the same port a durable adapter
//! would implement.

mod memory;
mod profile;

pub use memory::MemoryMessageStore;
pub use profile::MemoryProfileStore;
