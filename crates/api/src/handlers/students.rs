//! Institution handlers for student connections: the students who have
//! applied, their academic detail, and chat history.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, Query, State};
use axum::Json;
use careers_core::error::CoreError;
use careers_core::grading::gpa_color;
use careers_core::search::{matches_search, non_blank};
use careers_core::status::ApplicationStatus;
use careers_core::types::{DocId, Timestamp};
use careers_db::models::application::Application;
use careers_db::models::chat::ChatMessage;
use careers_db::models::user::{AcademicRecord, User};
use careers_db::repositories::{ApplicationRepo, ChatRepo};
use serde::Serialize;

use super::applications::ApplicationView;
use super::summaries::{course_summary, courses_by_id, users_by_id, StudentSummary};
use crate::error::AppResult;
use crate::middleware::rbac::RequireInstitution;
use crate::query::StudentFilter;
use crate::response::Envelope;
use crate::state::AppState;

/// A connected student as listed for an institution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListing {
    #[serde(flatten)]
    pub summary: StudentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    /// Status of the latest application to this institution.
    pub status: ApplicationStatus,
    pub application_count: usize,
    pub last_applied: Timestamp,
    pub is_online: bool,
}

/// Full detail for the student profile modal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub listing: StudentListing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub academics: Vec<AcademicRecord>,
    pub communications: Vec<ChatMessage>,
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Serialize)]
pub struct StudentsPayload {
    pub students: Vec<StudentListing>,
}

#[derive(Debug, Serialize)]
pub struct StudentPayload {
    pub student: StudentDetail,
}

#[derive(Debug, Serialize)]
pub struct MessagesPayload {
    pub messages: Vec<ChatMessage>,
}

/// Applications grouped per student; each group is newest first because
/// the repository returns them that way.
fn group_by_student(applications: Vec<Application>) -> HashMap<DocId, Vec<Application>> {
    let mut grouped: HashMap<DocId, Vec<Application>> = HashMap::new();
    for app in applications {
        grouped.entry(app.student_id.clone()).or_default().push(app);
    }
    grouped
}

fn build_listing(user: &User, applications: &[Application], is_online: bool) -> Option<StudentListing> {
    let latest = applications.first()?;
    let profile = &user.profile_data;
    Some(StudentListing {
        summary: StudentSummary::from_user(user),
        gpa_color: profile.gpa.map(gpa_color),
        year: profile.year,
        course_name: profile.course_name.clone(),
        status: latest.status,
        application_count: applications.len(),
        last_applied: latest.applied_date,
        is_online,
    })
}

struct Criteria {
    search: Option<String>,
    course: Option<String>,
    year: Option<u32>,
    status: Option<ApplicationStatus>,
}

impl Criteria {
    fn parse(filter: StudentFilter) -> Result<Self, CoreError> {
        let year = non_blank(filter.year)
            .map(|y| {
                y.parse::<u32>()
                    .map_err(|_| CoreError::Validation(format!("Invalid year '{y}'")))
            })
            .transpose()?;
        Ok(Self {
            search: non_blank(filter.search),
            course: non_blank(filter.course),
            year,
            status: non_blank(filter.status).map(|s| s.parse()).transpose()?,
        })
    }

    fn matches(&self, student: &StudentListing, applications: &[Application]) -> bool {
        if let Some(course) = &self.course {
            if !applications.iter().any(|a| &a.course_id == course) {
                return false;
            }
        }
        if self.year.is_some() && self.year != student.year {
            return false;
        }
        if self.status.is_some_and(|s| s != student.status) {
            return false;
        }
        self.search.as_deref().map_or(true, |needle| {
            matches_search(
                needle,
                [student.summary.name.as_str(), student.summary.email.as_str()],
            )
        })
    }
}

/// GET /api/institution/students?search&course&year&status
pub async fn list_students(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<StudentFilter>,
) -> AppResult<Json<Envelope<StudentsPayload>>> {
    let criteria = Criteria::parse(filter)?;
    let grouped =
        group_by_student(ApplicationRepo::list_for_institution(&state.pool, &user.uid).await?);
    let users = users_by_id(&state.pool, grouped.keys()).await?;

    let mut students = Vec::new();
    for (student_id, applications) in &grouped {
        let Some(student) = users.get(student_id) else {
            continue;
        };
        let online = state.ws_manager.is_online(student_id).await;
        if let Some(entry) = build_listing(student, applications, online) {
            if criteria.matches(&entry, applications) {
                students.push(entry);
            }
        }
    }
    students.sort_by(|a, b| b.last_applied.cmp(&a.last_applied));

    Ok(Json(Envelope::ok(StudentsPayload { students })))
}

/// GET /api/institution/students/{id}
///
/// Only students with at least one application to the caller are visible.
pub async fn get_student(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(student_id): Path<DocId>,
) -> AppResult<Json<Envelope<StudentPayload>>> {
    let applications: Vec<Application> =
        ApplicationRepo::list_for_student(&state.pool, &student_id)
            .await?
            .into_iter()
            .filter(|a| a.institution_id == user.uid)
            .collect();

    let users = users_by_id(&state.pool, [&student_id]).await?;
    let online = state.ws_manager.is_online(&student_id).await;
    let (Some(student), false) = (users.get(&student_id), applications.is_empty()) else {
        return Err(CoreError::not_found("Student", student_id).into());
    };
    let Some(listing) = build_listing(student, &applications, online) else {
        return Err(CoreError::not_found("Student", student_id).into());
    };

    let courses = courses_by_id(&state.pool, &user.uid).await?;
    let communications = ChatRepo::conversation(&state.pool, &user.uid, &student_id).await?;
    let profile = &student.profile_data;
    let applications = applications
        .into_iter()
        .map(|application| ApplicationView {
            student: listing.summary.clone(),
            course: course_summary(&courses, &application.course_id),
            application,
        })
        .collect();

    Ok(Json(Envelope::ok(StudentPayload {
        student: StudentDetail {
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            skills: profile.skills.clone(),
            academics: profile.academics.clone(),
            communications,
            applications,
            listing,
        },
    })))
}

/// GET /api/institution/chat/{student_id}/history
pub async fn chat_history(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(student_id): Path<DocId>,
) -> AppResult<Json<Envelope<MessagesPayload>>> {
    let messages = ChatRepo::conversation(&state.pool, &user.uid, &student_id).await?;
    Ok(Json(Envelope::ok(MessagesPayload { messages })))
}

/// Distinct student ids with an application to `institution_id`.
pub async fn connected_student_ids(
    state: &AppState,
    institution_id: &str,
) -> AppResult<BTreeSet<DocId>> {
    Ok(ApplicationRepo::list_for_institution(&state.pool, institution_id)
        .await?
        .into_iter()
        .map(|a| a.student_id)
        .collect())
}
