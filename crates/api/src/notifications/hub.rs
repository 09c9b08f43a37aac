//! Per-user broadcast channels behind the notification event stream.

use std::collections::HashMap;

use careers_core::types::DocId;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

/// Buffered notices per user before slow streams start lagging.
const USER_CHANNEL_CAPACITY: usize = 64;

/// The `data` of one notification stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(rename = "type")]
    pub notice_type: String,
    pub title: String,
    pub message: String,
}

/// Fans notices out to every open stream of a user.
///
/// Channels are created on first subscription and dropped by
/// [`NotificationHub::prune`] once nobody listens.
#[derive(Default)]
pub struct NotificationHub {
    channels: RwLock<HashMap<DocId, broadcast::Sender<Notice>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a receiver for `user_id`'s notices.
    pub async fn subscribe(&self, user_id: &str) -> broadcast::Receiver<Notice> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(USER_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Deliver a notice to the user's open streams.
    ///
    /// Returns how many streams received it; zero when the user has none.
    pub async fn publish(&self, user_id: &str, notice: Notice) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(user_id)
            .and_then(|tx| tx.send(notice).ok())
            .unwrap_or(0)
    }

    /// Drop channels with no remaining subscribers.
    pub async fn prune(&self) {
        self.channels
            .write()
            .await
            .retain(|_, tx| tx.receiver_count() > 0);
    }

    /// Number of users with at least one channel allocated.
    pub async fn user_count(&self) -> usize {
        self.channels.read().await.len()
    }
}
