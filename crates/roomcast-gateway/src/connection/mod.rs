//! Connection ownership
//!
//! One `Connection` per live WebSocket, owned by the `ConnectionManager`.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState};
pub use manager::ConnectionManager;
