//! Campus events: institutions publish them, students browse and RSVP.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::types::DocId;
use careers_db::models::event::{CampusEvent, CreateEvent};
use careers_db::repositories::{EventRepo, RsvpOutcome};
use careers_events::{kinds, PlatformEvent};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireInstitution, RequireStudent};
use crate::response::Envelope;
use crate::state::AppState;

/// An event as shown to a particular student.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: CampusEvent,
    #[serde(rename = "canRSVP")]
    pub can_rsvp: bool,
}

impl EventView {
    fn for_user(event: CampusEvent, user_id: &str) -> Self {
        Self {
            can_rsvp: event.can_rsvp(user_id),
            event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventsPayload {
    pub events: Vec<EventView>,
}

#[derive(Debug, Serialize)]
pub struct EventPayload<T: Serialize> {
    pub event: T,
}

/// POST /api/institution/events
pub async fn create_event(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Envelope<EventPayload<CampusEvent>>>)> {
    input.validate().map_err(CoreError::from)?;
    let event = EventRepo::create(&state.pool, &user.uid, &input).await?;
    tracing::info!(institution = %user.uid, event = %event.id, "Campus event created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(EventPayload { event })),
    ))
}

/// GET /api/student/events -- upcoming events, soonest first.
pub async fn list_upcoming(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<EventsPayload>>> {
    let events = EventRepo::list_upcoming(&state.pool, chrono::Utc::now())
        .await?
        .into_iter()
        .map(|e| EventView::for_user(e, &user.uid))
        .collect();
    Ok(Json(Envelope::ok(EventsPayload { events })))
}

/// POST /api/student/events/{id}/rsvp
pub async fn rsvp(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<Json<Envelope<EventPayload<EventView>>>> {
    let event = match EventRepo::rsvp(&state.pool, &id, &user.uid).await? {
        RsvpOutcome::Accepted(event) => event,
        RsvpOutcome::AlreadyRegistered(_) => {
            return Err(CoreError::Conflict("You have already RSVP'd to this event".into()).into());
        }
        RsvpOutcome::Full(_) => {
            return Err(CoreError::Conflict("This event is full".into()).into());
        }
        RsvpOutcome::NotFound => return Err(CoreError::not_found("Event", id).into()),
    };

    state.event_bus.publish(
        PlatformEvent::new(kinds::EVENT_RSVP)
            .with_source("event", event.id.clone())
            .with_actor(user.uid.clone())
            .with_summary("Event RSVP", format!("You RSVP'd to {}", event.title)),
    );
    tracing::info!(event = %event.id, uid = %user.uid, "RSVP recorded");
    Ok(Json(Envelope::with_message(
        "RSVP confirmed",
        EventPayload {
            event: EventView::for_user(event, &user.uid),
        },
    )))
}
