//! Institution handlers for `/applications`: listing, review, documents
//! and CSV export.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::search::{matches_search, non_blank, DateRange};
use careers_core::status::ApplicationStatus;
use careers_core::types::DocId;
use careers_db::models::application::{Application, ApplicationDocument, ReviewApplication};
use careers_db::models::course::Course;
use careers_db::models::user::User;
use careers_db::repositories::{AdmissionRepo, ApplicationRepo, CourseRepo, SeatReservation};
use careers_events::{kinds, PlatformEvent};
use serde::Serialize;

use super::summaries::{
    course_summary, courses_by_id, student_summary, users_by_id, CourseSummary, StudentSummary,
};
use crate::error::AppResult;
use crate::export::Csv;
use crate::middleware::rbac::RequireInstitution;
use crate::query::ApplicationFilter;
use crate::response::Envelope;
use crate::state::AppState;

/// An application with its student and course embedded.
#[derive(Debug, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub student: StudentSummary,
    pub course: CourseSummary,
}

#[derive(Debug, Serialize)]
pub struct ApplicationsPayload {
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationPayload {
    pub application: ApplicationView,
}

#[derive(Debug, Serialize)]
pub struct DocumentsPayload {
    pub documents: Vec<ApplicationDocument>,
}

/// Parsed form of [`ApplicationFilter`].
struct Criteria {
    search: Option<String>,
    course: Option<String>,
    status: Option<ApplicationStatus>,
    range: DateRange,
}

impl Criteria {
    fn parse(filter: ApplicationFilter) -> Result<Self, CoreError> {
        Ok(Self {
            search: non_blank(filter.search),
            course: non_blank(filter.course),
            status: non_blank(filter.status).map(|s| s.parse()).transpose()?,
            range: DateRange::parse(filter.date_from, filter.date_to)?,
        })
    }

    fn matches(&self, view: &ApplicationView) -> bool {
        let app = &view.application;
        if self.course.as_deref().is_some_and(|c| c != app.course_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != app.status) {
            return false;
        }
        if !self.range.contains(app.applied_date) {
            return false;
        }
        self.search.as_deref().map_or(true, |needle| {
            matches_search(
                needle,
                [
                    view.student.name.as_str(),
                    view.student.email.as_str(),
                    view.course.name.as_str(),
                ],
            )
        })
    }
}

fn to_view(
    application: Application,
    users: &HashMap<DocId, User>,
    courses: &HashMap<DocId, Course>,
) -> ApplicationView {
    ApplicationView {
        student: student_summary(users, &application.student_id),
        course: course_summary(courses, &application.course_id),
        application,
    }
}

/// The institution's applications matching `filter`, newest first.
async fn filtered_views(
    state: &AppState,
    institution_id: &str,
    filter: ApplicationFilter,
) -> AppResult<Vec<ApplicationView>> {
    let criteria = Criteria::parse(filter)?;
    let applications = ApplicationRepo::list_for_institution(&state.pool, institution_id).await?;
    let users = users_by_id(&state.pool, applications.iter().map(|a| &a.student_id)).await?;
    let courses = courses_by_id(&state.pool, institution_id).await?;

    Ok(applications
        .into_iter()
        .map(|a| to_view(a, &users, &courses))
        .filter(|v| criteria.matches(v))
        .collect())
}

/// GET /api/institution/applications?search&course&status&dateFrom&dateTo
pub async fn list_applications(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> AppResult<Json<Envelope<ApplicationsPayload>>> {
    let applications = filtered_views(&state, &user.uid, filter).await?;
    Ok(Json(Envelope::ok(ApplicationsPayload { applications })))
}

/// GET /api/institution/applications/export -- CSV of the filtered list.
pub async fn export_applications(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> AppResult<Response> {
    let views = filtered_views(&state, &user.uid, filter).await?;

    let mut csv = Csv::new([
        "Student", "Email", "Course", "Status", "Applied", "Reviewed", "Notes",
    ]);
    for view in &views {
        let app = &view.application;
        csv.push([
            view.student.name.clone(),
            view.student.email.clone(),
            view.course.name.clone(),
            app.status.to_string(),
            app.applied_date.format("%Y-%m-%d").to_string(),
            app.reviewed_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            app.review_notes.clone().unwrap_or_default(),
        ]);
    }
    tracing::info!(institution = %user.uid, rows = csv.len(), "Applications exported");
    Ok(csv.into_attachment("applications.csv"))
}

/// One application with its student and course, scoped to the caller.
async fn owned_view(state: &AppState, id: &str, institution_id: &str) -> AppResult<ApplicationView> {
    let application = ApplicationRepo::find_owned(&state.pool, id, institution_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Application", id))?
        .value;
    let users = users_by_id(&state.pool, [&application.student_id]).await?;
    let courses: HashMap<DocId, Course> = CourseRepo::find_by_id(&state.pool, &application.course_id)
        .await?
        .map(|c| (c.id.clone(), c))
        .into_iter()
        .collect();
    Ok(to_view(application, &users, &courses))
}

/// GET /api/institution/applications/{id}
pub async fn get_application(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<Json<Envelope<ApplicationPayload>>> {
    let application = owned_view(&state, &id, &user.uid).await?;
    Ok(Json(Envelope::ok(ApplicationPayload { application })))
}

/// GET /api/institution/applications/{id}/documents
pub async fn get_documents(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<Json<Envelope<DocumentsPayload>>> {
    let application = ApplicationRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Application", id))?
        .value;
    Ok(Json(Envelope::ok(DocumentsPayload {
        documents: application.documents,
    })))
}

/// PUT /api/institution/applications/{id}/review
///
/// Seat accounting follows the status change:
///
/// 1. Becoming ACCEPTED reserves a seat first (409 when none are left).
/// 2. The status is written with compare-and-set; if another review got
///    there first, the reserved seat is released and 409 is returned.
/// 3. A new acceptance creates the admission.
/// 4. Leaving ACCEPTED releases the seat and withdraws the admission.
pub async fn review_application(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<ReviewApplication>,
) -> AppResult<Json<Envelope<ApplicationPayload>>> {
    let current = ApplicationRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Application", id.clone()))?;
    let previous = current.value.status;
    let course_id = current.value.course_id.clone();

    let accepting = input.status == ApplicationStatus::Accepted && previous != ApplicationStatus::Accepted;
    let leaving_accepted =
        previous == ApplicationStatus::Accepted && input.status != ApplicationStatus::Accepted;

    if accepting {
        match CourseRepo::reserve_seat(&state.pool, &course_id).await? {
            SeatReservation::Reserved(course) => {
                tracing::debug!(course = %course.id, left = course.available_seats, "Seat reserved");
            }
            SeatReservation::Full(_) => {
                return Err(CoreError::Conflict("No seats available for this course".into()).into());
            }
            SeatReservation::NotFound => {
                return Err(CoreError::not_found("Course", course_id).into());
            }
        }
    }

    let notes = non_blank(input.notes);
    let reviewed = match ApplicationRepo::record_review(
        &state.pool,
        &current.value,
        current.version,
        input.status,
        notes,
    )
    .await
    {
        Ok(app) => app,
        Err(e) => {
            if accepting {
                if let Err(release) = CourseRepo::release_seat(&state.pool, &course_id).await {
                    tracing::error!(course = %course_id, error = %release, "Failed to release seat");
                }
            }
            return Err(e.into());
        }
    };

    if accepting {
        let admission = AdmissionRepo::create_for_application(&state.pool, &reviewed).await?;
        tracing::info!(application = %reviewed.id, admission = %admission.id, "Admission created");
    } else if leaving_accepted {
        CourseRepo::release_seat(&state.pool, &course_id).await?;
        let withdrawn = AdmissionRepo::withdraw_for_application(&state.pool, &reviewed.id).await?;
        tracing::info!(application = %reviewed.id, withdrawn, "Acceptance revoked");
    }

    let view = owned_view(&state, &reviewed.id, &user.uid).await?;
    state.event_bus.publish(
        PlatformEvent::new(kinds::APPLICATION_REVIEWED)
            .with_source("application", reviewed.id.clone())
            .with_actor(user.uid.clone())
            .with_recipients(vec![reviewed.student_id.clone()])
            .with_summary(
                "Application update",
                format!(
                    "Your application for {} is now {}",
                    view.course.name, reviewed.status
                ),
            )
            .with_payload(serde_json::json!({
                "status": reviewed.status,
                "previousStatus": previous,
            })),
    );

    tracing::info!(
        application = %reviewed.id,
        from = %previous,
        to = %reviewed.status,
        "Application reviewed"
    );
    Ok(Json(Envelope::ok(ApplicationPayload { application: view })))
}
