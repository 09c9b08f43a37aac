//! Course applications.

use careers_core::status::ApplicationStatus;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const COLLECTION: &str = "applications";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: DocId,
    pub student_id: DocId,
    pub course_id: DocId,
    pub institution_id: DocId,
    pub status: ApplicationStatus,
    pub applied_date: Timestamp,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<Timestamp>,
    #[serde(default)]
    pub documents: Vec<ApplicationDocument>,
}

/// A supporting document attached to an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplicationDocument {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// DTO for a student applying to a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub course_id: DocId,
    #[serde(default)]
    #[validate(nested)]
    pub documents: Vec<ApplicationDocument>,
}

/// DTO for an institution's review decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApplication {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}
