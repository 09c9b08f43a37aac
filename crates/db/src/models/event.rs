//! Campus events students can RSVP to.

use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const COLLECTION: &str = "events";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusEvent {
    pub id: DocId,
    pub institution_id: DocId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: Timestamp,
    /// `None` means unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub rsvps: Vec<DocId>,
}

impl CampusEvent {
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.rsvps.len() >= cap as usize)
    }

    pub fn has_rsvp(&self, user_id: &str) -> bool {
        self.rsvps.iter().any(|id| id == user_id)
    }

    /// Whether `user_id` may still RSVP.
    pub fn can_rsvp(&self, user_id: &str) -> bool {
        !self.is_full() && !self.has_rsvp(user_id)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: Timestamp,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub capacity: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(capacity: Option<u32>, rsvps: &[&str]) -> CampusEvent {
        CampusEvent {
            id: "e1".into(),
            institution_id: "i1".into(),
            title: "Open day".into(),
            description: String::new(),
            date: chrono::Utc::now(),
            capacity,
            rsvps: rsvps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn rsvp_rules() {
        assert!(event(None, &["a", "b"]).can_rsvp("c"));
        assert!(!event(None, &["a"]).can_rsvp("a"));
        assert!(!event(Some(2), &["a", "b"]).can_rsvp("c"));
        assert!(event(Some(3), &["a", "b"]).can_rsvp("c"));
    }
}
