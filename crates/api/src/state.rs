use std::sync::Arc;

use crate::auth::identity::IdentityProvider;
use crate::config::ServerConfig;
use crate::notifications::NotificationHub;
use crate::ws::WsManager;
use tokio_util::sync::CancellationToken;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Document store handle.
    pub pool: careers_db::DbPool,
    /// Identity provider used for registration and token verification.
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (chat clients).
    pub ws_manager: Arc<WsManager>,
    /// Per-user fan-out feeding the notification event streams.
    pub notification_hub: Arc<NotificationHub>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<careers_events::EventBus>,
    /// Cancelled when the server starts shutting down; long-lived
    /// responses end on it.
    pub shutdown: CancellationToken,
}
