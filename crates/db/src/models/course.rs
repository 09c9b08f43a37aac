//! Course documents.

use careers_core::status::CourseStatus;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const COLLECTION: &str = "courses";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: DocId,
    pub institution_id: DocId,
    pub name: String,
    #[serde(default)]
    pub faculty_id: Option<DocId>,
    /// Faculty display name, copied at write time.
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub total_seats: u32,
    pub available_seats: u32,
    #[serde(default)]
    pub fees: Option<f64>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub status: CourseStatus,
    #[serde(default)]
    pub application_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    /// Open for applications: active with at least one free seat.
    pub fn is_open(&self) -> bool {
        self.status == CourseStatus::Active && self.available_seats > 0
    }
}

/// DTO for creating a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub faculty_id: Option<DocId>,
    pub code: Option<String>,
    #[serde(default)]
    pub description: String,
    pub duration: Option<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub total_seats: u32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fees: Option<f64>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// DTO for updating a course. All fields optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub faculty_id: Option<DocId>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub total_seats: Option<u32>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fees: Option<f64>,
    pub requirements: Option<Vec<String>>,
}

/// Body of the status endpoint. Without a status the course is toggled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseStatusUpdate {
    pub status: Option<CourseStatus>,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn create_requires_name_and_seats() {
        let dto: CreateCourse =
            serde_json::from_value(serde_json::json!({"name": "", "totalSeats": 0})).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("total_seats"));
    }

    #[test]
    fn status_body_is_optional() {
        let body: CourseStatusUpdate = serde_json::from_str("{}").unwrap();
        assert!(body.status.is_none());
        let body: CourseStatusUpdate = serde_json::from_str(r#"{"status":"inactive"}"#).unwrap();
        assert_eq!(body.status, Some(CourseStatus::Inactive));
    }
}
