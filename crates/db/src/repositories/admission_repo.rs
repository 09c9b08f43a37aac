//! Repository for the `admissions` collection.

use careers_core::status::AdmissionStatus;
use careers_core::types::{DocId, Timestamp};
use serde_json::json;

use super::{fetch, fetch_all, insert};
use crate::models::admission::{Admission, COLLECTION};
use crate::models::application::Application;
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Provides operations on admission documents.
pub struct AdmissionRepo;

impl AdmissionRepo {
    /// Admit the student behind an accepted application.
    pub async fn create_for_application(
        pool: &DbPool,
        application: &Application,
    ) -> Result<Admission, StoreError> {
        let admission = Admission {
            id: DocId::new(),
            application_id: application.id.clone(),
            student_id: application.student_id.clone(),
            course_id: application.course_id.clone(),
            institution_id: application.institution_id.clone(),
            status: AdmissionStatus::Admitted,
            admission_date: chrono::Utc::now(),
            enrollment_date: None,
            notes: None,
        };
        insert(pool, COLLECTION, &admission).await
    }

    pub async fn find_owned(
        pool: &DbPool,
        id: &str,
        institution_id: &str,
    ) -> Result<Option<Admission>, StoreError> {
        Ok(fetch::<Admission>(pool, COLLECTION, id)
            .await?
            .filter(|a| a.institution_id == institution_id))
    }

    /// An institution's admissions, newest first.
    pub async fn list_for_institution(
        pool: &DbPool,
        institution_id: &str,
    ) -> Result<Vec<Admission>, StoreError> {
        let query = Query::new()
            .eq("institutionId", institution_id)
            .order_by("admissionDate", Direction::Desc);
        fetch_all(pool, COLLECTION, &query).await
    }

    pub async fn list_for_application(
        pool: &DbPool,
        application_id: &str,
    ) -> Result<Vec<Admission>, StoreError> {
        let query = Query::new().eq("applicationId", application_id);
        fetch_all(pool, COLLECTION, &query).await
    }

    /// Update the enrollment status and optional date/notes.
    pub async fn update_enrollment(
        pool: &DbPool,
        id: &str,
        status: AdmissionStatus,
        enrollment_date: Option<Timestamp>,
        notes: Option<String>,
    ) -> Result<Admission, StoreError> {
        let mut patch = json!({ "status": status });
        if let Some(date) = enrollment_date {
            patch["enrollmentDate"] = json!(date);
        }
        if let Some(notes) = notes {
            patch["notes"] = json!(notes);
        }
        pool.update(COLLECTION, id, patch).await?.decode()
    }

    /// Withdraw every live admission created from `application_id`.
    ///
    /// Returns how many were withdrawn.
    pub async fn withdraw_for_application(
        pool: &DbPool,
        application_id: &str,
    ) -> Result<usize, StoreError> {
        let mut withdrawn = 0;
        for admission in Self::list_for_application(pool, application_id).await? {
            if admission.status == AdmissionStatus::Withdrawn {
                continue;
            }
            pool.update(
                COLLECTION,
                &admission.id,
                json!({ "status": AdmissionStatus::Withdrawn }),
            )
            .await?;
            withdrawn += 1;
        }
        Ok(withdrawn)
    }
}
