//! Store traits (ports) - define the interface the engine needs
//!
//! The domain layer defines what it needs; the store crate provides the
//! implementation.

mod stores;

pub use stores::{MessageStore, ProfileStore, StoreResult};
