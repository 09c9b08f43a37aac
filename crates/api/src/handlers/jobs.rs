//! Company job postings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::types::DocId;
use careers_core::validation::is_blank;
use careers_db::models::job::{CreateJob, JobPosting, UpdateJobStatus};
use careers_db::repositories::{JobRepo, UserRepo};
use careers_events::{kinds, PlatformEvent};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireCompany;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobsPayload {
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
pub struct JobPayload {
    pub job: JobPosting,
}

/// GET /api/company/jobs -- the company's own postings, newest first.
pub async fn list_jobs(
    RequireCompany(user): RequireCompany,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<JobsPayload>>> {
    let jobs = JobRepo::list_for_company(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(JobsPayload { jobs })))
}

/// POST /api/company/jobs
pub async fn create_job(
    RequireCompany(user): RequireCompany,
    State(state): State<AppState>,
    Json(input): Json<CreateJob>,
) -> AppResult<(StatusCode, Json<Envelope<JobPayload>>)> {
    input.validate().map_err(CoreError::from)?;

    let company = match input.company.as_deref().filter(|c| !is_blank(c)) {
        Some(name) => name.trim().to_string(),
        None => UserRepo::find_by_id(&state.pool, &user.uid)
            .await?
            .map(|u| u.profile_data.display_name(&u.email).to_string())
            .unwrap_or_else(|| user.email.clone()),
    };

    let job = JobRepo::create(&state.pool, &user.uid, &company, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(kinds::JOB_POSTED)
            .with_source("job", job.id.clone())
            .with_actor(user.uid.clone())
            .with_summary("Job posted", format!("{company} posted {}", job.title)),
    );
    tracing::info!(company = %user.uid, job = %job.id, "Job posted");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Job posted", JobPayload { job })),
    ))
}

/// PUT /api/company/jobs/{id}/status
pub async fn update_job_status(
    RequireCompany(user): RequireCompany,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<UpdateJobStatus>,
) -> AppResult<Json<Envelope<JobPayload>>> {
    JobRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Job", id.clone()))?;

    let job = JobRepo::set_status(&state.pool, &id, input.status).await?;
    tracing::info!(company = %user.uid, job = %id, status = %job.status, "Job status changed");
    Ok(Json(Envelope::ok(JobPayload { job })))
}
