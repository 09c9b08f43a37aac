//! Career platform event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope handlers publish.
//! - [`ActivityRecorder`] -- background service that turns events into
//!   activity-feed entries.

pub mod bus;
pub mod kinds;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::ActivityRecorder;
