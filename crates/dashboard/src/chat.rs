//! WebSocket chat client.
//!
//! [`ChatSocket`] is a reconnectable [`Session`]: each run connects to
//! the chat endpoint, forwards queued outgoing messages and hands every
//! server frame to the view. [`ChatHandle`] is the sending side the view
//! keeps.

use async_trait::async_trait;
use careers_core::types::{DocId, Timestamp};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{DashboardError, DashboardResult};
use crate::session::Session;

const FRAME_BUFFER: usize = 64;

/// A frame sent by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Chat { recipient_id: DocId, content: String },
}

/// A frame pushed by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    #[serde(rename_all = "camelCase")]
    Chat {
        id: DocId,
        sender_id: DocId,
        recipient_id: DocId,
        content: String,
        timestamp: Timestamp,
    },
    Notification {
        title: String,
        message: String,
    },
    Error {
        message: String,
    },
}

/// Sending side of a chat connection.
#[derive(Clone)]
pub struct ChatHandle {
    outgoing: mpsc::Sender<ClientFrame>,
}

impl ChatHandle {
    /// Queue a message for `recipient_id`.
    ///
    /// Blank messages are dropped and return `Ok(false)`. Messages queued
    /// while disconnected go out after the next reconnect.
    pub async fn send_message(&self, recipient_id: &str, content: &str) -> DashboardResult<bool> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(false);
        }
        self.outgoing
            .send(ClientFrame::Chat {
                recipient_id: recipient_id.to_string(),
                content: content.to_string(),
            })
            .await
            .map_err(|_| DashboardError::ChannelClosed)?;
        Ok(true)
    }
}

/// Frames waiting for a connection. A frame whose write failed is held
/// back and goes out first on the next connection.
struct Outbox {
    queue: mpsc::Receiver<ClientFrame>,
    unsent: Option<ClientFrame>,
}

impl Outbox {
    async fn next(&mut self) -> Option<ClientFrame> {
        match self.unsent.take() {
            Some(frame) => Some(frame),
            None => self.queue.recv().await,
        }
    }

    fn put_back(&mut self, frame: ClientFrame) {
        self.unsent = Some(frame);
    }
}

pub struct ChatSocket {
    url: String,
    outgoing: Mutex<Outbox>,
    incoming: mpsc::Sender<ServerFrame>,
}

impl ChatSocket {
    /// Create a socket for `ws_url`, authenticating with `token` in the
    /// query string.
    pub fn new(
        ws_url: &str,
        token: &str,
    ) -> (Self, ChatHandle, mpsc::Receiver<ServerFrame>) {
        let (out_tx, out_rx) = mpsc::channel(FRAME_BUFFER);
        let (in_tx, in_rx) = mpsc::channel(FRAME_BUFFER);
        let socket = Self {
            url: format!("{ws_url}?token={token}"),
            outgoing: Mutex::new(Outbox {
                queue: out_rx,
                unsent: None,
            }),
            incoming: in_tx,
        };
        (socket, ChatHandle { outgoing: out_tx }, in_rx)
    }

    async fn deliver(&self, text: &str) -> DashboardResult<()> {
        match serde_json::from_str::<ServerFrame>(text) {
            Ok(frame) => self
                .incoming
                .send(frame)
                .await
                .map_err(|_| DashboardError::ChannelClosed),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unrecognised chat frame");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Session for ChatSocket {
    fn name(&self) -> &str {
        "chat"
    }

    async fn run_once(&self) -> DashboardResult<()> {
        let (ws_stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| DashboardError::Connection(format!("Failed to open chat socket: {e}")))?;
        tracing::info!("Chat socket connected");

        let (mut write, mut read) = ws_stream.split();
        let mut outgoing = self.outgoing.lock().await;

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.deliver(&text).await?,
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Chat socket closed by server");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
                queued = outgoing.next() => match queued {
                    Some(frame) => {
                        let text = serde_json::to_string(&frame)?;
                        if let Err(e) = write.send(Message::Text(text)).await {
                            outgoing.put_back(frame);
                            return Err(e.into());
                        }
                    }
                    None => {
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(());
                    }
                },
            }
        }
    }
}
