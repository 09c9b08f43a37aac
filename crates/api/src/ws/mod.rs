//! WebSocket chat.
//!
//! Provides connection management, the chat frame protocol, heartbeat
//! pings, and the HTTP upgrade handler mounted at `/ws`.

pub mod chat;
mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
