//! Notification delivery.
//!
//! The [`NotificationRouter`] subscribes to the event bus, stores a
//! notification for every recipient and pushes it live through the
//! [`NotificationHub`] (server-sent events) and the WebSocket manager.

pub mod hub;
pub mod router;

pub use hub::{Notice, NotificationHub};
pub use router::NotificationRouter;
