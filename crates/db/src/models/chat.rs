//! Direct chat messages between two users.

use careers_core::roles::Role;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "chat_messages";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: DocId,
    pub sender_id: DocId,
    pub sender_role: Role,
    pub recipient_id: DocId,
    pub content: String,
    pub timestamp: Timestamp,
}
