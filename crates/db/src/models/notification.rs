//! Stored user notifications.

use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "notifications";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DocId,
    pub user_id: DocId,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub read: bool,
}
