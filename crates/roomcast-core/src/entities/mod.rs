//! Domain entities - core business objects

mod identity;
mod message;
mod session;
mod typing;

pub use identity::{Identity, Profile, UserId};
pub use message::{Message, MessageId, MessageKind, MessageStatus};
pub use session::{Session, SessionId};
pub use typing::{TypingEvent, TYPING_EXPIRY};
