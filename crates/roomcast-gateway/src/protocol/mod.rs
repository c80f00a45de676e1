//! Gateway wire protocol
//!
//! Tagged event enums exchanged over the WebSocket connection.

mod close_codes;
mod events;

pub use close_codes::CloseCode;
pub use events::{
    ClientEvent, DeleteMessagePayload, IdentifyPayload, JoinPayload, ReadyPayload, RoomMember,
    SendMessagePayload, ServerEvent, TypingPayload,
};
