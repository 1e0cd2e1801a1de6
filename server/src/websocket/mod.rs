//! WebSocket support for real-time sync.
//!
//! Clients subscribe to one token over a WebSocket and receive the token's
//! full bookmark set whenever any device changes it, so they no longer need
//! to poll `GET /api/urls`.

mod manager;
mod protocol;

pub use manager::ConnectionManager;
pub use protocol::*;
