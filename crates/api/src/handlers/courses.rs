//! Institution handlers for `/courses` and `/faculties`.
//!
//! Every lookup is scoped to the calling institution; another
//! institution's course id reads as 404.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::search::{matches_search, non_blank};
use careers_core::status::CourseStatus;
use careers_core::types::DocId;
use careers_db::models::course::{Course, CourseStatusUpdate, CreateCourse, UpdateCourse};
use careers_db::models::faculty::{CreateFaculty, Faculty};
use careers_db::repositories::{CourseRepo, FacultyRepo};
use careers_events::{kinds, PlatformEvent};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireInstitution;
use crate::query::CourseFilter;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CoursesPayload {
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct CoursePayload {
    pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct FacultiesPayload {
    pub faculties: Vec<Faculty>,
}

#[derive(Debug, Serialize)]
pub struct FacultyPayload {
    pub faculty: Faculty,
}

/// Resolve a faculty id to its name, requiring it to be the caller's.
async fn faculty_name(
    state: &AppState,
    institution_id: &str,
    faculty_id: Option<&DocId>,
) -> AppResult<Option<String>> {
    let Some(id) = faculty_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(None);
    };
    let faculty = FacultyRepo::find_owned(&state.pool, id, institution_id)
        .await?
        .ok_or_else(|| CoreError::Validation(format!("Unknown faculty '{id}'")))?;
    Ok(Some(faculty.name))
}

fn course_matches(course: &Course, filter: &CourseFilter, status: Option<CourseStatus>) -> bool {
    if let Some(search) = non_blank(filter.search.clone()) {
        let fields = [
            Some(course.name.as_str()),
            course.code.as_deref(),
            Some(course.description.as_str()),
        ];
        if !matches_search(&search, fields.into_iter().flatten()) {
            return false;
        }
    }
    if let Some(faculty) = non_blank(filter.faculty.clone()) {
        if course.faculty_id.as_deref() != Some(faculty.as_str()) {
            return false;
        }
    }
    status.map_or(true, |wanted| wanted == course.status)
}

// ---------------------------------------------------------------------------
// Faculties
// ---------------------------------------------------------------------------

/// GET /api/institution/faculties
pub async fn list_faculties(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<FacultiesPayload>>> {
    let faculties = FacultyRepo::list_for_institution(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(FacultiesPayload { faculties })))
}

/// POST /api/institution/faculties
pub async fn create_faculty(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Json(input): Json<CreateFaculty>,
) -> AppResult<(StatusCode, Json<Envelope<FacultyPayload>>)> {
    input.validate().map_err(CoreError::from)?;
    let faculty = FacultyRepo::create(&state.pool, &user.uid, &input.name).await?;
    tracing::info!(institution = %user.uid, faculty = %faculty.id, "Faculty created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(FacultyPayload { faculty })),
    ))
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// GET /api/institution/courses?search&faculty&status
pub async fn list_courses(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> AppResult<Json<Envelope<CoursesPayload>>> {
    let status: Option<CourseStatus> = non_blank(filter.status.clone())
        .map(|s| s.parse())
        .transpose()?;

    let courses = CourseRepo::list_for_institution(&state.pool, &user.uid)
        .await?
        .into_iter()
        .filter(|c| course_matches(c, &filter, status))
        .collect();
    Ok(Json(Envelope::ok(CoursesPayload { courses })))
}

/// GET /api/institution/courses/{id}
pub async fn get_course(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<Json<Envelope<CoursePayload>>> {
    let course = CourseRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id))?;
    Ok(Json(Envelope::ok(CoursePayload { course })))
}

/// POST /api/institution/courses
///
/// New courses start ACTIVE with every seat available.
pub async fn create_course(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<Envelope<CoursePayload>>)> {
    input.validate().map_err(CoreError::from)?;
    let faculty = faculty_name(&state, &user.uid, input.faculty_id.as_ref()).await?;

    let course = CourseRepo::create(&state.pool, &user.uid, &input, faculty).await?;
    tracing::info!(institution = %user.uid, course = %course.id, "Course created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(CoursePayload { course })),
    ))
}

/// PUT /api/institution/courses/{id}
///
/// A change to `totalSeats` shifts `availableSeats` by the same amount;
/// shrinking below the seats already taken is a conflict.
pub async fn update_course(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<Envelope<CoursePayload>>> {
    input.validate().map_err(CoreError::from)?;

    let current = CourseRepo::find_versioned(&state.pool, &id)
        .await?
        .filter(|v| v.value.institution_id == user.uid)
        .ok_or_else(|| CoreError::not_found("Course", id.clone()))?;
    let mut course = current.value;

    if let Some(total) = input.total_seats {
        course.available_seats = shifted_seats(&course, total)?;
        course.total_seats = total;
    }
    if input.faculty_id.is_some() {
        course.faculty = faculty_name(&state, &user.uid, input.faculty_id.as_ref()).await?;
        course.faculty_id = input.faculty_id.filter(|f| !f.trim().is_empty());
    }
    if let Some(name) = input.name {
        course.name = name.trim().to_string();
    }
    if input.code.is_some() {
        course.code = input.code;
    }
    if let Some(description) = input.description {
        course.description = description;
    }
    if input.duration.is_some() {
        course.duration = input.duration;
    }
    if input.fees.is_some() {
        course.fees = input.fees;
    }
    if let Some(requirements) = input.requirements {
        course.requirements = requirements;
    }
    course.updated_at = chrono::Utc::now();

    let course = CourseRepo::replace(&state.pool, &course, current.version).await?;
    tracing::info!(course = %course.id, "Course updated");
    Ok(Json(Envelope::ok(CoursePayload { course })))
}

/// The optional `{status}` body of a status update. An empty body toggles.
fn parse_status_body(body: &[u8]) -> Result<Option<CourseStatus>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let update: CourseStatusUpdate = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("Invalid status body: {e}")))?;
    Ok(update.status)
}

/// Available seats after changing the total to `new_total`.
fn shifted_seats(course: &Course, new_total: u32) -> Result<u32, CoreError> {
    let delta = i64::from(new_total) - i64::from(course.total_seats);
    let available = i64::from(course.available_seats) + delta;
    u32::try_from(available).map_err(|_| {
        let taken = course.total_seats - course.available_seats;
        CoreError::Conflict(format!(
            "Cannot reduce total seats to {new_total}: {taken} seats are already taken"
        ))
    })
}

/// PUT /api/institution/courses/{id}/status
///
/// Sets the given status, or toggles ACTIVE/INACTIVE when the body has none.
pub async fn update_course_status(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    body: Bytes,
) -> AppResult<Json<Envelope<CoursePayload>>> {
    let requested = parse_status_body(&body)?;

    CourseRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id.clone()))?;

    let course = CourseRepo::set_status(&state.pool, &id, requested)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id.clone()))?;

    state.event_bus.publish(
        PlatformEvent::new(kinds::COURSE_STATUS_CHANGED)
            .with_source("course", course.id.clone())
            .with_actor(user.uid.clone())
            .with_payload(serde_json::json!({ "status": course.status })),
    );
    tracing::info!(course = %course.id, status = %course.status, "Course status changed");
    Ok(Json(Envelope::ok(CoursePayload { course })))
}
