//! Repository for the `events` collection (campus events).

use careers_core::types::{DocId, Timestamp};
use serde_json::json;

use super::{fetch, fetch_all, insert, modify, Modified};
use crate::models::event::{CampusEvent, CreateEvent, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Outcome of an RSVP attempt.
#[derive(Debug, Clone)]
pub enum RsvpOutcome {
    Accepted(CampusEvent),
    AlreadyRegistered(CampusEvent),
    Full(CampusEvent),
    NotFound,
}

pub struct EventRepo;

impl EventRepo {
    pub async fn create(
        pool: &DbPool,
        institution_id: &str,
        input: &CreateEvent,
    ) -> Result<CampusEvent, StoreError> {
        let event = CampusEvent {
            id: DocId::new(),
            institution_id: institution_id.to_string(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            date: input.date,
            capacity: input.capacity,
            rsvps: Vec::new(),
        };
        insert(pool, COLLECTION, &event).await
    }

    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<CampusEvent>, StoreError> {
        fetch(pool, COLLECTION, id).await
    }

    /// Events on or after `now`, soonest first.
    pub async fn list_upcoming(
        pool: &DbPool,
        now: Timestamp,
    ) -> Result<Vec<CampusEvent>, StoreError> {
        let query = Query::new()
            .gte("date", json!(now))
            .order_by("date", Direction::Asc);
        fetch_all(pool, COLLECTION, &query).await
    }

    /// Add `user_id` to the RSVP list unless already present or full.
    pub async fn rsvp(pool: &DbPool, id: &str, user_id: &str) -> Result<RsvpOutcome, StoreError> {
        let outcome = modify(pool, COLLECTION, id, |event: &mut CampusEvent| {
            if !event.can_rsvp(user_id) {
                return false;
            }
            event.rsvps.push(user_id.to_string());
            true
        })
        .await?;
        Ok(match outcome {
            Modified::Written(event) => RsvpOutcome::Accepted(event),
            Modified::Declined(event) if event.has_rsvp(user_id) => {
                RsvpOutcome::AlreadyRegistered(event)
            }
            Modified::Declined(event) => RsvpOutcome::Full(event),
            Modified::Missing => RsvpOutcome::NotFound,
        })
    }
}
