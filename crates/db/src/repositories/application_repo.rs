//! Repository for the `applications` collection.

use careers_core::status::ApplicationStatus;
use careers_core::types::DocId;

use super::{fetch, fetch_all, fetch_versioned, insert, replace, Versioned};
use crate::models::application::{Application, ApplicationDocument, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Provides operations on application documents.
pub struct ApplicationRepo;

impl ApplicationRepo {
    pub async fn create(
        pool: &DbPool,
        student_id: &str,
        course_id: &str,
        institution_id: &str,
        documents: Vec<ApplicationDocument>,
    ) -> Result<Application, StoreError> {
        let application = Application {
            id: DocId::new(),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            institution_id: institution_id.to_string(),
            status: ApplicationStatus::Pending,
            applied_date: chrono::Utc::now(),
            review_notes: None,
            reviewed_at: None,
            documents,
        };
        insert(pool, COLLECTION, &application).await
    }

    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<Application>, StoreError> {
        fetch(pool, COLLECTION, id).await
    }

    /// Find an application only if it was made to `institution_id`.
    pub async fn find_owned(
        pool: &DbPool,
        id: &str,
        institution_id: &str,
    ) -> Result<Option<Versioned<Application>>, StoreError> {
        Ok(fetch_versioned::<Application>(pool, COLLECTION, id)
            .await?
            .filter(|a| a.value.institution_id == institution_id))
    }

    /// Applications received by an institution, newest first.
    pub async fn list_for_institution(
        pool: &DbPool,
        institution_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let query = Query::new()
            .eq("institutionId", institution_id)
            .order_by("appliedDate", Direction::Desc);
        fetch_all(pool, COLLECTION, &query).await
    }

    /// Applications made by a student, newest first.
    pub async fn list_for_student(
        pool: &DbPool,
        student_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let query = Query::new()
            .eq("studentId", student_id)
            .order_by("appliedDate", Direction::Desc);
        fetch_all(pool, COLLECTION, &query).await
    }

    /// The student's non-rejected application to a course, if any.
    pub async fn find_active_for_course(
        pool: &DbPool,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Application>, StoreError> {
        let query = Query::new()
            .eq("studentId", student_id)
            .eq("courseId", course_id);
        let existing: Vec<Application> = fetch_all(pool, COLLECTION, &query).await?;
        Ok(existing.into_iter().find(|a| a.status.is_active()))
    }

    /// Write a review decision, provided nobody else changed the
    /// application since it was read at `expected_version`.
    pub async fn record_review(
        pool: &DbPool,
        current: &Application,
        expected_version: u64,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Application, StoreError> {
        let mut updated = current.clone();
        updated.status = status;
        if notes.is_some() {
            updated.review_notes = notes;
        }
        updated.reviewed_at = Some(chrono::Utc::now());
        replace(pool, COLLECTION, &current.id, expected_version, &updated).await
    }
}
