//! # roomcast-gateway
//!
//! WebSocket gateway for real-time room messaging and presence.

pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::run;
