//! Repository for the `courses` collection, including seat accounting.

use careers_core::status::CourseStatus;
use careers_core::types::DocId;

use super::{fetch, fetch_all, fetch_versioned, insert, modify, replace, Modified, Versioned};
use crate::models::course::{Course, CreateCourse, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Outcome of trying to take one seat on a course.
#[derive(Debug, Clone)]
pub enum SeatReservation {
    Reserved(Course),
    /// No seats left; nothing was written.
    Full(Course),
    NotFound,
}

/// Provides operations on course documents.
pub struct CourseRepo;

impl CourseRepo {
    /// Create an active course with every seat available.
    pub async fn create(
        pool: &DbPool,
        institution_id: &str,
        input: &CreateCourse,
        faculty_name: Option<String>,
    ) -> Result<Course, StoreError> {
        let now = chrono::Utc::now();
        let course = Course {
            id: DocId::new(),
            institution_id: institution_id.to_string(),
            name: input.name.trim().to_string(),
            faculty_id: input.faculty_id.clone(),
            faculty: faculty_name,
            code: input.code.clone(),
            description: input.description.clone(),
            duration: input.duration.clone(),
            total_seats: input.total_seats,
            available_seats: input.total_seats,
            fees: input.fees,
            requirements: input.requirements.clone(),
            status: CourseStatus::Active,
            application_count: 0,
            created_at: now,
            updated_at: now,
        };
        insert(pool, COLLECTION, &course).await
    }

    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<Course>, StoreError> {
        fetch(pool, COLLECTION, id).await
    }

    pub async fn find_versioned(
        pool: &DbPool,
        id: &str,
    ) -> Result<Option<Versioned<Course>>, StoreError> {
        fetch_versioned(pool, COLLECTION, id).await
    }

    /// Find a course only if it belongs to `institution_id`.
    pub async fn find_owned(
        pool: &DbPool,
        id: &str,
        institution_id: &str,
    ) -> Result<Option<Course>, StoreError> {
        Ok(Self::find_by_id(pool, id)
            .await?
            .filter(|c| c.institution_id == institution_id))
    }

    /// All courses of an institution, newest first.
    pub async fn list_for_institution(
        pool: &DbPool,
        institution_id: &str,
    ) -> Result<Vec<Course>, StoreError> {
        let query = Query::new()
            .eq("institutionId", institution_id)
            .order_by("createdAt", Direction::Desc);
        fetch_all(pool, COLLECTION, &query).await
    }

    /// Active courses across all institutions.
    pub async fn list_active(pool: &DbPool) -> Result<Vec<Course>, StoreError> {
        let query = Query::new().eq("status", CourseStatus::Active.as_str());
        fetch_all(pool, COLLECTION, &query).await
    }

    /// Write back a course read at `expected_version`.
    pub async fn replace(
        pool: &DbPool,
        course: &Course,
        expected_version: u64,
    ) -> Result<Course, StoreError> {
        replace(pool, COLLECTION, &course.id, expected_version, course).await
    }

    /// Set the status explicitly, or toggle it when `status` is `None`.
    pub async fn set_status(
        pool: &DbPool,
        id: &str,
        status: Option<CourseStatus>,
    ) -> Result<Option<Course>, StoreError> {
        let outcome = modify(pool, COLLECTION, id, |course: &mut Course| {
            let next = status.unwrap_or(course.status.toggled());
            course.status = next;
            course.updated_at = chrono::Utc::now();
            true
        })
        .await?;
        Ok(match outcome {
            Modified::Written(c) | Modified::Declined(c) => Some(c),
            Modified::Missing => None,
        })
    }

    /// Take one seat, retrying on concurrent writers.
    ///
    /// `availableSeats` never drops below zero.
    pub async fn reserve_seat(pool: &DbPool, id: &str) -> Result<SeatReservation, StoreError> {
        let outcome = modify(pool, COLLECTION, id, |course: &mut Course| {
            if course.available_seats == 0 {
                return false;
            }
            course.available_seats -= 1;
            course.updated_at = chrono::Utc::now();
            true
        })
        .await?;
        Ok(match outcome {
            Modified::Written(c) => SeatReservation::Reserved(c),
            Modified::Declined(c) => SeatReservation::Full(c),
            Modified::Missing => SeatReservation::NotFound,
        })
    }

    /// Give a seat back. Never exceeds `totalSeats`.
    pub async fn release_seat(pool: &DbPool, id: &str) -> Result<Option<Course>, StoreError> {
        let outcome = modify(pool, COLLECTION, id, |course: &mut Course| {
            if course.available_seats >= course.total_seats {
                return false;
            }
            course.available_seats += 1;
            course.updated_at = chrono::Utc::now();
            true
        })
        .await?;
        Ok(match outcome {
            Modified::Written(c) | Modified::Declined(c) => Some(c),
            Modified::Missing => None,
        })
    }

    /// Bump the denormalised application counter.
    pub async fn increment_application_count(pool: &DbPool, id: &str) -> Result<(), StoreError> {
        modify(pool, COLLECTION, id, |course: &mut Course| {
            course.application_count += 1;
            true
        })
        .await?;
        Ok(())
    }
}
