//! # roomcast-core
//!
//! Domain layer containing entities, id newtypes, errors, and store traits.
//! This crate has zero dependencies on infrastructure (web framework, runtime state, etc.).

pub mod entities;
pub mod error;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{
    Identity, Message, MessageId, MessageKind, MessageStatus, Profile, Session, SessionId,
    TypingEvent, UserId, TYPING_EXPIRY,
};
pub use error::DomainError;
pub use traits::{MessageStore, ProfileStore, StoreResult};
