//! Admissions, created when an application is accepted.

use careers_core::status::AdmissionStatus;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "admissions";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: DocId,
    pub application_id: DocId,
    pub student_id: DocId,
    pub course_id: DocId,
    pub institution_id: DocId,
    pub status: AdmissionStatus,
    pub admission_date: Timestamp,
    #[serde(default)]
    pub enrollment_date: Option<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// DTO for the enrollment endpoint. `enrollmentDate` accepts
/// `YYYY-MM-DD` or RFC 3339.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollment {
    pub status: AdmissionStatus,
    #[serde(default)]
    pub enrollment_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
