//! Repository for the `chat_messages` collection.

use careers_core::roles::Role;
use careers_core::types::DocId;

use super::{fetch_all, insert};
use crate::models::chat::{ChatMessage, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

pub struct ChatRepo;

impl ChatRepo {
    pub async fn create(
        pool: &DbPool,
        sender_id: &str,
        sender_role: Role,
        recipient_id: &str,
        content: &str,
    ) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: DocId::new(),
            sender_id: sender_id.to_string(),
            sender_role,
            recipient_id: recipient_id.to_string(),
            content: content.to_string(),
            timestamp: chrono::Utc::now(),
        };
        insert(pool, COLLECTION, &message).await
    }

    /// Messages exchanged between `a` and `b` in either direction, oldest first.
    pub async fn conversation(
        pool: &DbPool,
        a: &str,
        b: &str,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let mut messages: Vec<ChatMessage> = Vec::new();
        for (sender, recipient) in [(a, b), (b, a)] {
            let query = Query::new()
                .eq("senderId", sender)
                .eq("recipientId", recipient)
                .order_by("timestamp", Direction::Asc);
            messages.extend(fetch_all::<ChatMessage>(pool, COLLECTION, &query).await?);
        }
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}
