/// Errors raised by the dashboard client.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `message` is the envelope's
    /// message when the body was a JSON error envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose envelope did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The local end of a channel was dropped.
    #[error("Channel closed")]
    ChannelClosed,
}

impl DashboardError {
    /// Whether the API rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DashboardError::Api { status: 401 | 403, .. })
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Decode(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DashboardError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        DashboardError::Protocol(e.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
