use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use careers_core::types::{DocId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Outbound queue of one chat socket.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One open socket belonging to a user.
pub struct WsConnection {
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open chat sockets, indexed by user.
///
/// A user may hold several sockets (one per open dashboard tab). A user is
/// online while at least one of them is registered, which is what the
/// institution's student list reports as `isOnline`.
#[derive(Default)]
pub struct WsManager {
    users: RwLock<HashMap<DocId, HashMap<String, WsConnection>>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket for `user_id` and return the queue its writer task
    /// drains.
    pub async fn add(&self, conn_id: String, user_id: DocId) -> mpsc::UnboundedReceiver<Message> {
        let (sender, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender,
            connected_at: chrono::Utc::now(),
        };
        self.users
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id, conn);
        rx
    }

    /// Drop a socket. The user entry goes away with its last socket.
    pub async fn remove(&self, user_id: &str, conn_id: &str) {
        let mut users = self.users.write().await;
        if let Some(conns) = users.get_mut(user_id) {
            conns.remove(conn_id);
            if conns.is_empty() {
                users.remove(user_id);
            }
        }
    }

    pub async fn is_online(&self, user_id: &str) -> bool {
        self.users.read().await.contains_key(user_id)
    }

    /// Queue `message` on every socket of `user_id`. Returns how many
    /// sockets accepted it.
    pub async fn send_to_user(&self, user_id: &str, message: Message) -> usize {
        let users = self.users.read().await;
        users.get(user_id).map_or(0, |conns| {
            conns
                .values()
                .filter(|conn| conn.sender.send(message.clone()).is_ok())
                .count()
        })
    }

    /// Queue `message` on a single socket. Returns `false` if it is gone.
    pub async fn send_to_connection(&self, user_id: &str, conn_id: &str, message: Message) -> bool {
        self.users
            .read()
            .await
            .get(user_id)
            .and_then(|conns| conns.get(conn_id))
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Total open sockets across all users.
    pub async fn connection_count(&self) -> usize {
        self.users.read().await.values().map(HashMap::len).sum()
    }

    /// Ping every socket and forget those whose writer has exited.
    ///
    /// Returns the number of sockets removed.
    pub async fn ping_and_prune(&self) -> usize {
        let mut users = self.users.write().await;
        let mut pruned = 0;
        users.retain(|_, conns| {
            conns.retain(|_, conn| {
                let alive = conn.sender.send(Message::Ping(Bytes::new())).is_ok();
                if !alive {
                    pruned += 1;
                }
                alive
            });
            !conns.is_empty()
        });
        pruned
    }

    /// Send a Close frame to every socket and clear the registry.
    pub async fn shutdown_all(&self) {
        let mut users = self.users.write().await;
        let mut count = 0;
        for conn in users.values().flat_map(HashMap::values) {
            let _ = conn.sender.send(Message::Close(None));
            count += 1;
        }
        users.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn presence_follows_the_last_socket() {
        let manager = WsManager::new();
        let _a = manager.add("a".into(), "u1".into()).await;
        let _b = manager.add("b".into(), "u1".into()).await;
        let _c = manager.add("c".into(), "u3".into()).await;

        assert!(manager.is_online("u1").await);
        assert!(!manager.is_online("u2").await);
        assert_eq!(
            manager.send_to_user("u1", Message::Text("x".into())).await,
            2
        );
        assert_eq!(manager.send_to_user("u2", Message::Text("x".into())).await, 0);

        manager.remove("u1", "a").await;
        assert!(manager.is_online("u1").await);
        manager.remove("u1", "b").await;
        assert!(!manager.is_online("u1").await);
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn send_to_connection_targets_one_socket() {
        let manager = WsManager::new();
        let mut a = manager.add("a".into(), "u1".into()).await;
        let mut b = manager.add("b".into(), "u1".into()).await;

        assert!(manager.send_to_connection("u1", "b", Message::Text("only b".into())).await);
        assert!(!manager.send_to_connection("u1", "zz", Message::Text("x".into())).await);

        assert!(a.try_recv().is_err());
        assert!(matches!(b.try_recv(), Ok(Message::Text(t)) if t.as_str() == "only b"));
    }

    #[tokio::test]
    async fn ping_prunes_sockets_whose_writer_is_gone() {
        let manager = WsManager::new();
        let mut live = manager.add("a".into(), "u1".into()).await;
        let dead = manager.add("b".into(), "u2".into()).await;
        drop(dead);

        assert_eq!(manager.ping_and_prune().await, 1);
        assert!(!manager.is_online("u2").await);
        assert!(matches!(live.recv().await, Some(Message::Ping(_))));
    }

    #[tokio::test]
    async fn shutdown_sends_close_and_clears() {
        let manager = WsManager::new();
        let mut rx = manager.add("a".into(), "u1".into()).await;
        manager.shutdown_all().await;
        assert!(matches!(rx.recv().await, Some(Message::Close(None))));
        assert_eq!(manager.connection_count().await, 0);
    }
}
