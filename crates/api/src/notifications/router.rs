//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and, for
//! every recipient named on an event, stores a notification and pushes it
//! to the recipient's open event streams and chat sockets.

use std::sync::Arc;

use axum::extract::ws::Message;
use careers_db::repositories::NotificationRepo;
use careers_db::{DbPool, StoreError};
use careers_events::PlatformEvent;
use serde_json::json;
use tokio::sync::broadcast;

use super::hub::{Notice, NotificationHub};
use crate::ws::WsManager;

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    hub: Arc<NotificationHub>,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, hub: Arc<NotificationHub>, ws_manager: Arc<WsManager>) -> Self {
        Self {
            pool,
            hub,
            ws_manager,
        }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](careers_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event to all of its recipients.
    ///
    /// Returns the number of notifications stored.
    pub async fn route_event(&self, event: &PlatformEvent) -> Result<usize, StoreError> {
        if event.recipients.is_empty() {
            return Ok(0);
        }

        let mut stored = 0;
        let mut idle_channels = false;
        for user_id in &event.recipients {
            NotificationRepo::create(
                &self.pool,
                user_id,
                event.category(),
                &event.title,
                &event.message,
            )
            .await?;
            stored += 1;

            let notice = Notice {
                notice_type: event.category().to_string(),
                title: event.title.clone(),
                message: event.message.clone(),
            };
            if self.hub.publish(user_id, notice).await == 0 {
                idle_channels = true;
            }

            let frame = json!({
                "type": "notification",
                "title": event.title,
                "message": event.message,
            });
            self.ws_manager
                .send_to_user(user_id, Message::Text(frame.to_string().into()))
                .await;
        }

        if idle_channels {
            self.hub.prune().await;
        }
        tracing::debug!(event_type = %event.event_type, stored, "Event routed");
        Ok(stored)
    }
}
