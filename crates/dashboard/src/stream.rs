//! Server-sent notification stream client.

use std::time::Duration;

use async_trait::async_trait;
use careers_core::roles::Role;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::client::ApiClient;
use crate::error::{DashboardError, DashboardResult};
use crate::models::Notice;
use crate::session::Session;

const NOTICE_BUFFER: usize = 64;

/// Incremental parser for `text/event-stream` bodies.
///
/// Only `data:` fields matter to the dashboards; comments (keep-alives)
/// and other fields are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed a body chunk; returns the `data` of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend(chunk.iter().copied().filter(|&b| b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(data) = event_data(&String::from_utf8_lossy(&block)) {
                events.push(data);
            }
        }
        events
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn event_data(block: &str) -> Option<String> {
    let lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// The notification stream of one role, as a reconnectable [`Session`].
pub struct NotificationStream {
    http: reqwest::Client,
    url: String,
    token: String,
    notices: mpsc::Sender<Notice>,
}

impl NotificationStream {
    /// Build a stream client for `role`. Parsed notices arrive on the
    /// returned receiver.
    ///
    /// The stream never completes on its own, so it gets its own HTTP
    /// client bounded only by `connect_timeout`.
    pub fn new(
        api: &ApiClient,
        role: Role,
        connect_timeout: Duration,
    ) -> DashboardResult<(Self, mpsc::Receiver<Notice>)> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        let (notices, rx) = mpsc::channel(NOTICE_BUFFER);
        Ok((
            Self {
                http,
                url: api.role_url(role, "/notifications/stream"),
                token: api.token().to_string(),
                notices,
            },
            rx,
        ))
    }
}

#[async_trait]
impl Session for NotificationStream {
    fn name(&self) -> &str {
        "notifications"
    }

    async fn run_once(&self) -> DashboardResult<()> {
        let response = self
            .http
            .get(&self.url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ApiClient::ensure_success(response).await?;
        tracing::info!(url = %self.url, "Notification stream connected");

        let mut decoder = SseDecoder::default();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            for data in decoder.push(&chunk?) {
                match serde_json::from_str::<Notice>(&data) {
                    Ok(notice) => {
                        self.notices
                            .send(notice)
                            .await
                            .map_err(|_| DashboardError::ChannelClosed)?;
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed notification"),
                }
            }
        }

        tracing::info!(url = %self.url, "Notification stream ended");
        Ok(())
    }
}
