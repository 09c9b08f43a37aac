//! Job postings published by companies.

use careers_core::status::JobStatus;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const COLLECTION: &str = "jobs";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: DocId,
    pub company_id: DocId,
    /// Company display name.
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub posted_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJob {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Overrides the company name taken from the poster's profile.
    pub company: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobStatus {
    pub status: JobStatus,
}
