//! Institution broadcast messages to connected students.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::types::DocId;
use careers_core::validation::is_blank;
use careers_db::repositories::ApplicationRepo;
use careers_events::{kinds, PlatformEvent};
use serde::{Deserialize, Serialize};

use super::students::connected_student_ids;
use super::summaries::users_by_id;
use crate::error::AppResult;
use crate::middleware::rbac::RequireInstitution;
use crate::response::Envelope;
use crate::state::AppState;

/// Who a broadcast goes to. `recipients` is interpreted per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// Every connected student.
    All,
    /// Students who applied to any course id in `recipients`.
    Course,
    /// Students whose profile year is in `recipients`.
    Year,
    /// The student ids in `recipients`.
    Custom,
}

/// Body of `POST /api/institution/broadcast`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    /// Free-form category chosen by the sender, e.g. `"announcement"`.
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    pub recipient_type: RecipientType,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Accepted for compatibility; delivery is always immediate.
    #[serde(default)]
    pub scheduled_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BroadcastPayload {
    pub recipients: usize,
}

/// Resolve the request's audience among the institution's connected students.
async fn resolve_recipients(
    state: &AppState,
    institution_id: &str,
    input: &BroadcastRequest,
) -> AppResult<Vec<DocId>> {
    let connected = connected_student_ids(state, institution_id).await?;
    let wanted: BTreeSet<&str> = input
        .recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();

    let selected: Vec<DocId> = match input.recipient_type {
        RecipientType::All => connected.into_iter().collect(),
        RecipientType::Custom => connected
            .into_iter()
            .filter(|id| wanted.contains(id.as_str()))
            .collect(),
        RecipientType::Course => ApplicationRepo::list_for_institution(&state.pool, institution_id)
            .await?
            .into_iter()
            .filter(|a| wanted.contains(a.course_id.as_str()))
            .map(|a| a.student_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        RecipientType::Year => {
            let years: BTreeSet<u32> = wanted.iter().filter_map(|y| y.parse().ok()).collect();
            users_by_id(&state.pool, connected.iter())
                .await?
                .into_values()
                .filter(|u| u.profile_data.year.is_some_and(|y| years.contains(&y)))
                .map(|u| u.id)
                .collect()
        }
    };
    Ok(selected)
}

/// POST /api/institution/broadcast
///
/// Sends the message as a notification to every resolved student and
/// returns how many were addressed.
pub async fn send_broadcast(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Json(input): Json<BroadcastRequest>,
) -> AppResult<Json<Envelope<BroadcastPayload>>> {
    if is_blank(&input.subject) || is_blank(&input.content) {
        return Err(CoreError::Validation("subject and content are required".into()).into());
    }
    if input.scheduled_time.is_some() {
        tracing::debug!(institution = %user.uid, "Scheduled broadcast sent immediately");
    }

    let recipients = resolve_recipients(&state, &user.uid, &input).await?;
    let count = recipients.len();
    if count > 0 {
        state.event_bus.publish(
            PlatformEvent::new(kinds::BROADCAST_SENT)
                .with_actor(user.uid.clone())
                .with_recipients(recipients)
                .with_summary(input.subject.trim(), input.content.trim())
                .with_payload(serde_json::json!({
                    "messageType": input.message_type,
                    "recipientType": input.recipient_type_str(),
                })),
        );
    }

    tracing::info!(institution = %user.uid, recipients = count, "Broadcast sent");
    Ok(Json(Envelope::with_message(
        format!("Message sent to {count} students"),
        BroadcastPayload { recipients: count },
    )))
}

impl BroadcastRequest {
    fn recipient_type_str(&self) -> &'static str {
        match self.recipient_type {
            RecipientType::All => "all",
            RecipientType::Course => "course",
            RecipientType::Year => "year",
            RecipientType::Custom => "custom",
        }
    }
}
