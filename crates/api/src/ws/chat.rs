//! Chat frame protocol carried over `/ws`.
//!
//! Clients send `{type:"chat", recipientId, content}`. The server answers
//! with [`ServerFrame`]s: delivered messages, pushed notifications, and
//! errors for frames it could not accept.

use careers_core::roles::Role;
use careers_core::types::{DocId, Timestamp};
use careers_core::validation::is_blank;
use careers_db::models::chat::ChatMessage;
use careers_db::repositories::{ChatRepo, UserRepo};
use careers_db::{DbPool, StoreError};
use serde::{Deserialize, Serialize};

/// Longest accepted chat message, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// A frame received from a client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Chat {
        #[serde(default)]
        recipient_id: String,
        #[serde(default)]
        content: String,
    },
}

/// A frame sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> Self {
        ServerFrame::Error {
            message: message.into(),
        }
    }

    pub fn to_text(&self) -> String {
        // Serializing these variants cannot fail: every field is a string
        // or a timestamp.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<ChatMessage> for ServerFrame {
    fn from(message: ChatMessage) -> Self {
        ServerFrame::Chat {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

/// Why a client frame was refused. Reported back as an error frame.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid message format")]
    Malformed,
    #[error("recipientId and content are required")]
    MissingFields,
    #[error("Message exceeds {MAX_CONTENT_CHARS} characters")]
    TooLong,
    #[error("Cannot send a message to yourself")]
    SelfMessage,
    #[error("Recipient not found")]
    UnknownRecipient,
    #[error("Failed to send message")]
    Store(#[from] StoreError),
}

/// Parse a text frame into a [`ClientFrame`].
pub fn parse_frame(text: &str) -> Result<ClientFrame, ChatError> {
    serde_json::from_str(text).map_err(|_| ChatError::Malformed)
}

/// Validate and persist a chat message from `sender_id`.
pub async fn accept_chat(
    pool: &DbPool,
    sender_id: &str,
    sender_role: Role,
    recipient_id: &str,
    content: &str,
) -> Result<ChatMessage, ChatError> {
    let content = content.trim();
    if is_blank(recipient_id) || content.is_empty() {
        return Err(ChatError::MissingFields);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ChatError::TooLong);
    }
    if recipient_id == sender_id {
        return Err(ChatError::SelfMessage);
    }
    if UserRepo::find_by_id(pool, recipient_id).await?.is_none() {
        return Err(ChatError::UnknownRecipient);
    }

    Ok(ChatRepo::create(pool, sender_id, sender_role, recipient_id, content).await?)
}
