//! Client-side shapes of the API payloads.
//!
//! Stored documents deserialize straight into the `careers-db` models;
//! the aggregate views the API assembles (stats, recommendations, joined
//! rows) get their own types here.

use careers_core::status::ApplicationStatus;
use careers_core::types::{DocId, Timestamp};
use careers_db::models::admission::Admission;
use careers_db::models::application::Application;
use careers_db::models::event::CampusEvent;
use careers_db::models::user::{AcademicRecord, ProfileData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StudentProfile {
    pub email: String,
    #[serde(flatten)]
    pub profile: ProfileData,
}

impl StudentProfile {
    pub fn display_name(&self) -> &str {
        self.profile.display_name(&self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendation {
    pub id: DocId,
    pub name: String,
    pub institution: String,
    pub match_score: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendation {
    pub id: DocId,
    pub title: String,
    pub company: String,
    pub match_score: u8,
}

/// A campus event as seen by the signed-in student.
#[derive(Debug, Clone, Deserialize)]
pub struct EventCard {
    #[serde(flatten)]
    pub event: CampusEvent,
    #[serde(rename = "canRSVP", default)]
    pub can_rsvp: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentRef {
    pub id: DocId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseRef {
    pub id: DocId,
    pub name: String,
    #[serde(default)]
    pub faculty: Option<String>,
}

/// An application joined with its student and course.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRow {
    #[serde(flatten)]
    pub application: Application,
    pub student: StudentRef,
    pub course: CourseRef,
}

/// An admission joined with its student and course.
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionRow {
    #[serde(flatten)]
    pub admission: Admission,
    pub student: StudentRef,
    pub course: CourseRef,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionStats {
    pub total: usize,
    pub acceptance_rate: f64,
    pub enrollment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistributionEntry {
    pub course: String,
    pub count: usize,
}

/// A student connected to the institution through an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListing {
    #[serde(flatten)]
    pub student: StudentRef,
    #[serde(default)]
    pub gpa_color: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub course_name: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub application_count: usize,
    pub last_applied: Timestamp,
    #[serde(default)]
    pub is_online: bool,
}

/// Profile detail shown in the student modal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub listing: StudentListing,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub academics: Vec<AcademicRecord>,
    #[serde(default)]
    pub communications: Vec<careers_db::models::chat::ChatMessage>,
}

/// The `data` of a notification stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(rename = "type")]
    pub notice_type: String,
    pub title: String,
    pub message: String,
}
