//! Per-user activity feed entries.

use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "activities";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: DocId,
    pub user_id: DocId,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

/// Insert DTO; the id and date are assigned on write.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: DocId,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
}
