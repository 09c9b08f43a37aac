//! Student handlers: profile, applications, recommendations and activity.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::matching::{match_score, rank_top, tokenize_all};
use careers_core::status::ApplicationStatus;
use careers_core::types::DocId;
use careers_core::validation::split_list;
use careers_db::models::activity::Activity;
use careers_db::models::application::{Application, CreateApplication};
use careers_db::models::user::{ProfileData, UpdateProfile};
use careers_db::repositories::{
    ActivityRepo, ApplicationRepo, CourseRepo, JobRepo, UserRepo,
};
use careers_events::{kinds, PlatformEvent};
use serde::Serialize;
use validator::Validate;

use super::summaries::users_by_id;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::response::Envelope;
use crate::state::AppState;

/// Recommendations returned per list.
const RECOMMENDATION_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub email: String,
    #[serde(flatten)]
    pub profile: ProfileData,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub profile: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct ApplicationsPayload {
    pub applications: Vec<Application>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationPayload {
    pub application: Application,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    /// PENDING, UNDER_REVIEW and WAITLISTED.
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: ApplicationStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendation {
    pub id: DocId,
    pub name: String,
    pub institution: String,
    pub match_score: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendation {
    pub id: DocId,
    pub title: String,
    pub company: String,
    pub match_score: u8,
}

#[derive(Debug, Serialize)]
pub struct CourseRecommendationsPayload {
    pub courses: Vec<CourseRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct JobRecommendationsPayload {
    pub jobs: Vec<JobRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct ActivitiesPayload {
    pub activities: Vec<Activity>,
}

pub fn summarize_applications(applications: &[Application]) -> ApplicationStats {
    applications
        .iter()
        .fold(ApplicationStats::default(), |mut stats, app| {
            stats.total += 1;
            match app.status {
                ApplicationStatus::Accepted => stats.accepted += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
                s if s.is_pending() => stats.pending += 1,
                _ => {}
            }
            stats
        })
}

async fn load_profile(state: &AppState, user: &AuthUser) -> AppResult<ProfileView> {
    let stored = UserRepo::find_by_id(&state.pool, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.uid.clone()))?;
    Ok(ProfileView {
        email: stored.email,
        profile: stored.profile_data,
    })
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/student/profile
pub async fn get_profile(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<ProfilePayload>>> {
    let profile = load_profile(&state, &user).await?;
    Ok(Json(Envelope::ok(ProfilePayload { profile })))
}

/// An uploaded profile photo, held in memory until validation passes.
struct Photo {
    extension: &'static str,
    bytes: Vec<u8>,
}

fn image_extension(content_type: Option<&str>, file_name: Option<&str>) -> Option<&'static str> {
    let by_type = match content_type.map(str::to_ascii_lowercase).as_deref() {
        Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/gif") => Some("gif"),
        Some("image/webp") => Some("webp"),
        _ => None,
    };
    by_type.or_else(|| {
        let ext = file_name?.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some("jpg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            _ => None,
        }
    })
}

/// PUT /api/student/profile (multipart)
///
/// Text fields `name`, `phone`, `bio`, comma-separated `skills` and
/// `interests`, and an optional image file under `photo`.
pub async fn update_profile(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Envelope<ProfilePayload>>> {
    let mut update = UpdateProfile::default();
    let mut photo: Option<Photo> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let extension = image_extension(field.content_type(), field.file_name());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("Failed to read photo: {e}")))?;
            if bytes.is_empty() {
                continue;
            }
            let extension = extension
                .ok_or_else(|| AppError::bad_request("Only image uploads are allowed"))?;
            photo = Some(Photo {
                extension,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read field '{name}': {e}")))?;
        let value = value.trim().to_string();
        match name.as_str() {
            "name" => update.name = Some(value),
            "phone" => update.phone = Some(value),
            "bio" => update.bio = Some(value),
            "skills" => update.skills = Some(split_list(&value)),
            "interests" => update.interests = Some(split_list(&value)),
            other => tracing::debug!(field = other, "Ignoring unknown profile field"),
        }
    }

    if let Some(photo) = photo {
        update.photo = Some(store_photo(&state, &user.uid, photo).await?);
    }

    let mut profile = UserRepo::find_by_id(&state.pool, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.uid.clone()))?
        .profile_data;
    update.apply(&mut profile);
    let stored = UserRepo::update_profile(&state.pool, &user.uid, &profile).await?;

    state.event_bus.publish(
        PlatformEvent::new(kinds::PROFILE_UPDATED)
            .with_source("user", user.uid.clone())
            .with_actor(user.uid.clone())
            .with_summary("Profile updated", "You updated your profile"),
    );
    tracing::info!(uid = %user.uid, "Profile updated");

    Ok(Json(Envelope::with_message(
        "Profile updated successfully",
        ProfilePayload {
            profile: ProfileView {
                email: stored.email,
                profile: stored.profile_data,
            },
        },
    )))
}

/// Write the photo under the upload directory and return its public URL.
async fn store_photo(state: &AppState, uid: &str, photo: Photo) -> AppResult<String> {
    let dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let file_name = format!("{uid}-{}.{}", uuid::Uuid::new_v4().simple(), photo.extension);
    tokio::fs::write(dir.join(&file_name), &photo.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store photo: {e}")))?;

    tracing::info!(uid = %uid, file = %file_name, size = photo.bytes.len(), "Profile photo stored");
    Ok(format!("{}/uploads/{file_name}", state.config.public_base_url))
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// GET /api/student/applications
pub async fn list_applications(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<ApplicationsPayload>>> {
    let applications = ApplicationRepo::list_for_student(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(ApplicationsPayload { applications })))
}

/// POST /api/student/applications
///
/// The course must be ACTIVE with seats left, and the student may hold
/// only one non-rejected application per course.
pub async fn apply(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<CreateApplication>,
) -> AppResult<(StatusCode, Json<Envelope<ApplicationPayload>>)> {
    input.validate().map_err(CoreError::from)?;

    let course = CourseRepo::find_by_id(&state.pool, &input.course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", input.course_id.clone()))?;
    if !course.is_open() {
        return Err(CoreError::Conflict("Course is not accepting applications".into()).into());
    }
    if ApplicationRepo::find_active_for_course(&state.pool, &user.uid, &course.id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("You have already applied to this course".into()).into());
    }

    let application = ApplicationRepo::create(
        &state.pool,
        &user.uid,
        &course.id,
        &course.institution_id,
        input.documents,
    )
    .await?;
    CourseRepo::increment_application_count(&state.pool, &course.id).await?;

    let student_name = UserRepo::find_by_id(&state.pool, &user.uid)
        .await?
        .map(|u| u.profile_data.display_name(&u.email).to_string())
        .unwrap_or_else(|| user.email.clone());
    state.event_bus.publish(
        PlatformEvent::new(kinds::APPLICATION_SUBMITTED)
            .with_source("application", application.id.clone())
            .with_actor(user.uid.clone())
            .with_recipients(vec![course.institution_id.clone()])
            .with_summary(
                "Application submitted",
                format!("{student_name} applied to {}", course.name),
            ),
    );

    tracing::info!(uid = %user.uid, course = %course.id, application = %application.id, "Application submitted");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Application submitted",
            ApplicationPayload { application },
        )),
    ))
}

/// GET /api/student/applications/stats
pub async fn application_stats(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<StatsPayload>>> {
    let applications = ApplicationRepo::list_for_student(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(StatsPayload {
        stats: summarize_applications(&applications),
    })))
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

fn profile_keywords(profile: &ProfileData) -> std::collections::BTreeSet<String> {
    tokenize_all(
        profile
            .skills
            .iter()
            .chain(&profile.interests)
            .map(String::as_str)
            .chain(profile.course_name.as_deref()),
    )
}

/// GET /api/student/recommendations/courses
///
/// Top ACTIVE courses with seats left, scored by keyword overlap with the
/// student's skills and interests.
pub async fn recommend_courses(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<CourseRecommendationsPayload>>> {
    let profile = load_profile(&state, &user).await?.profile;
    let keywords = profile_keywords(&profile);

    let scored: Vec<_> = CourseRepo::list_active(&state.pool)
        .await?
        .into_iter()
        .filter(|c| c.is_open())
        .map(|course| {
            let target = tokenize_all(
                [course.name.as_str(), course.description.as_str()]
                    .into_iter()
                    .chain(course.faculty.as_deref())
                    .chain(course.requirements.iter().map(String::as_str)),
            );
            (match_score(&keywords, &target), course)
        })
        .collect();
    let top = rank_top(scored, RECOMMENDATION_LIMIT);

    let institutions = users_by_id(&state.pool, top.iter().map(|(_, c)| &c.institution_id)).await?;
    let courses = top
        .into_iter()
        .map(|(score, course)| CourseRecommendation {
            institution: institutions
                .get(&course.institution_id)
                .map(|u| u.profile_data.display_name(&u.email).to_string())
                .unwrap_or_default(),
            id: course.id,
            name: course.name,
            match_score: score,
        })
        .collect();
    Ok(Json(Envelope::ok(CourseRecommendationsPayload { courses })))
}

/// GET /api/student/recommendations/jobs
pub async fn recommend_jobs(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<JobRecommendationsPayload>>> {
    let profile = load_profile(&state, &user).await?.profile;
    let keywords = profile_keywords(&profile);

    let scored: Vec<_> = JobRepo::list_open(&state.pool)
        .await?
        .into_iter()
        .map(|job| {
            let target = tokenize_all(
                [job.title.as_str(), job.description.as_str()]
                    .into_iter()
                    .chain(job.skills.iter().map(String::as_str)),
            );
            (match_score(&keywords, &target), job)
        })
        .collect();

    let jobs = rank_top(scored, RECOMMENDATION_LIMIT)
        .into_iter()
        .map(|(score, job)| JobRecommendation {
            id: job.id,
            title: job.title,
            company: job.company,
            match_score: score,
        })
        .collect();
    Ok(Json(Envelope::ok(JobRecommendationsPayload { jobs })))
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// GET /api/student/activity -- newest first, at most 20 entries.
pub async fn activity(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<ActivitiesPayload>>> {
    let activities = ActivityRepo::list_for_user(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(ActivitiesPayload { activities })))
}
