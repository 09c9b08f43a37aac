//! Shared response envelope for API handlers.
//!
//! Every JSON response carries `success`. Use [`Envelope`] rather than
//! ad-hoc `json!` so payload keys stay resource-named and typed.

use serde::Serialize;

/// `{ "success": true, "message"?: ..., ...payload }` response envelope.
///
/// The payload is flattened into the top level, so it must serialize as a
/// map (a struct or `json!({...})`).
///
/// ```ignore
/// Ok(Json(Envelope::ok(CoursesPayload { courses })))
/// ```
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn with_message(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            payload,
        }
    }
}
