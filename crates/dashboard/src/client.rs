//! REST client for the career guidance API.
//!
//! Wraps the role-scoped JSON endpoints using [`reqwest`]. Every
//! response is an envelope `{success, message?, <key>: ...}`; the typed
//! methods below unwrap the resource key they expect.

use std::time::Duration;

use careers_core::roles::Role;
use careers_core::status::{AdmissionStatus, ApplicationStatus};
use careers_db::models::activity::Activity;
use careers_db::models::admission::Admission;
use careers_db::models::application::{Application, ApplicationDocument};
use careers_db::models::chat::ChatMessage;
use careers_db::models::course::Course;
use careers_db::models::faculty::Faculty;
use careers_db::models::notification::Notification;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::filters::{
    AdmissionFilters, ApplicationFilters, CourseFilters, StudentFilters, TrendPeriod,
};
use crate::models::{
    AdmissionRow, AdmissionStats, ApplicationRow, ApplicationStats, CourseRecommendation,
    DistributionEntry, EventCard, JobRecommendation, StudentDetail, StudentListing,
    StudentProfile, TrendPoint,
};

/// Text fields of a profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    /// Comma-separated, as typed into the form.
    pub skills: Option<String>,
    pub interests: Option<String>,
}

/// An image attached to a profile update.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Audience of an institution broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    All,
    Course,
    Year,
    Custom,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    #[serde(rename = "type")]
    pub message_type: String,
    pub subject: String,
    pub content: String,
    pub recipient_type: RecipientType,
    pub recipients: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client bound to one API base URL and bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> DashboardResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, token))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> DashboardResult<Self> {
        Self::new(&config.api_url, &config.token, config.request_timeout)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Absolute URL for a role-scoped path such as `/courses`.
    pub fn role_url(&self, role: Role, path: &str) -> String {
        format!("{}/api/{}{}", self.base_url, role.as_str(), path)
    }

    // ---- student ----

    pub async fn profile(&self) -> DashboardResult<StudentProfile> {
        self.get(Role::Student, "/profile", &(), "profile").await
    }

    /// Update the profile as a multipart form, optionally with a photo.
    pub async fn update_profile(
        &self,
        form: &ProfileForm,
        photo: Option<PhotoUpload>,
    ) -> DashboardResult<StudentProfile> {
        let mut multipart = reqwest::multipart::Form::new();
        let fields = [
            ("name", &form.name),
            ("phone", &form.phone),
            ("bio", &form.bio),
            ("skills", &form.skills),
            ("interests", &form.interests),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                multipart = multipart.text(name, value.clone());
            }
        }
        if let Some(photo) = photo {
            let part = reqwest::multipart::Part::bytes(photo.bytes)
                .file_name(photo.file_name)
                .mime_str(&photo.content_type)?;
            multipart = multipart.part("photo", part);
        }

        let request = self
            .http
            .put(self.role_url(Role::Student, "/profile"))
            .bearer_auth(&self.token)
            .multipart(multipart);
        Self::field(request, "profile").await
    }

    pub async fn my_applications(&self) -> DashboardResult<Vec<Application>> {
        self.get(Role::Student, "/applications", &(), "applications")
            .await
    }

    pub async fn apply(&self, course_id: &str) -> DashboardResult<Application> {
        let request = self
            .http
            .post(self.role_url(Role::Student, "/applications"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "courseId": course_id }));
        Self::field(request, "application").await
    }

    pub async fn application_stats(&self) -> DashboardResult<ApplicationStats> {
        self.get(Role::Student, "/applications/stats", &(), "stats")
            .await
    }

    pub async fn recommended_courses(&self) -> DashboardResult<Vec<CourseRecommendation>> {
        self.get(Role::Student, "/recommendations/courses", &(), "courses")
            .await
    }

    pub async fn recommended_jobs(&self) -> DashboardResult<Vec<JobRecommendation>> {
        self.get(Role::Student, "/recommendations/jobs", &(), "jobs")
            .await
    }

    pub async fn activity(&self) -> DashboardResult<Vec<Activity>> {
        self.get(Role::Student, "/activity", &(), "activities").await
    }

    pub async fn upcoming_events(&self) -> DashboardResult<Vec<EventCard>> {
        self.get(Role::Student, "/events", &(), "events").await
    }

    pub async fn rsvp(&self, event_id: &str) -> DashboardResult<()> {
        let request = self
            .http
            .post(self.role_url(Role::Student, &format!("/events/{event_id}/rsvp")))
            .bearer_auth(&self.token);
        Self::check(request).await
    }

    // ---- institution: courses ----

    pub async fn faculties(&self) -> DashboardResult<Vec<Faculty>> {
        self.get(Role::Institution, "/faculties", &(), "faculties")
            .await
    }

    pub async fn courses(&self, filters: &CourseFilters) -> DashboardResult<Vec<Course>> {
        self.get(Role::Institution, "/courses", filters, "courses")
            .await
    }

    pub async fn course(&self, id: &str) -> DashboardResult<Course> {
        self.get(Role::Institution, &format!("/courses/{id}"), &(), "course")
            .await
    }

    /// Flip a course between ACTIVE and INACTIVE.
    pub async fn toggle_course_status(&self, id: &str) -> DashboardResult<Course> {
        let request = self
            .http
            .put(self.role_url(Role::Institution, &format!("/courses/{id}/status")))
            .bearer_auth(&self.token);
        Self::field(request, "course").await
    }

    // ---- institution: applications ----

    pub async fn applications(
        &self,
        filters: &ApplicationFilters,
    ) -> DashboardResult<Vec<ApplicationRow>> {
        self.get(Role::Institution, "/applications", filters, "applications")
            .await
    }

    pub async fn application_documents(
        &self,
        id: &str,
    ) -> DashboardResult<Vec<ApplicationDocument>> {
        self.get(
            Role::Institution,
            &format!("/applications/{id}/documents"),
            &(),
            "documents",
        )
        .await
    }

    pub async fn review_application(
        &self,
        id: &str,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> DashboardResult<Application> {
        let request = self
            .http
            .put(self.role_url(Role::Institution, &format!("/applications/{id}/review")))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "status": status, "notes": notes }));
        Self::field(request, "application").await
    }

    // ---- institution: admissions ----

    pub async fn admission_stats(&self) -> DashboardResult<AdmissionStats> {
        self.get(Role::Institution, "/admissions/stats", &(), "stats")
            .await
    }

    pub async fn admission_trends(&self, period: TrendPeriod) -> DashboardResult<Vec<TrendPoint>> {
        self.get(
            Role::Institution,
            "/admissions/trends",
            &[("period", period.as_str())],
            "trends",
        )
        .await
    }

    pub async fn admission_distribution(&self) -> DashboardResult<Vec<DistributionEntry>> {
        self.get(
            Role::Institution,
            "/admissions/distribution",
            &(),
            "distribution",
        )
        .await
    }

    pub async fn recent_admissions(
        &self,
        filters: &AdmissionFilters,
    ) -> DashboardResult<Vec<AdmissionRow>> {
        self.get(Role::Institution, "/admissions/recent", filters, "admissions")
            .await
    }

    pub async fn update_enrollment(
        &self,
        id: &str,
        status: AdmissionStatus,
        notes: Option<&str>,
    ) -> DashboardResult<Admission> {
        let request = self
            .http
            .put(self.role_url(Role::Institution, &format!("/admissions/{id}/enrollment")))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "status": status, "notes": notes }));
        Self::field(request, "admission").await
    }

    // ---- institution: students ----

    pub async fn students(&self, filters: &StudentFilters) -> DashboardResult<Vec<StudentListing>> {
        self.get(Role::Institution, "/students", filters, "students")
            .await
    }

    pub async fn student(&self, id: &str) -> DashboardResult<StudentDetail> {
        self.get(Role::Institution, &format!("/students/{id}"), &(), "student")
            .await
    }

    pub async fn chat_history(&self, student_id: &str) -> DashboardResult<Vec<ChatMessage>> {
        self.get(
            Role::Institution,
            &format!("/chat/{student_id}/history"),
            &(),
            "messages",
        )
        .await
    }

    /// Send a broadcast; returns how many students it reached.
    pub async fn broadcast(&self, message: &Broadcast) -> DashboardResult<usize> {
        let request = self
            .http
            .post(self.role_url(Role::Institution, "/broadcast"))
            .bearer_auth(&self.token)
            .json(message);
        Self::field(request, "recipients").await
    }

    // ---- any role ----

    pub async fn notifications(&self, role: Role, limit: usize) -> DashboardResult<Vec<Notification>> {
        self.get(role, "/notifications", &[("limit", limit)], "notifications")
            .await
    }

    // ---- private helpers ----

    async fn get<T, Q>(&self, role: Role, path: &str, query: &Q, key: &str) -> DashboardResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self
            .http
            .get(self.role_url(role, path))
            .bearer_auth(&self.token)
            .query(query);
        Self::field(request, key).await
    }

    /// Send `request` and deserialize envelope field `key`.
    async fn field<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        key: &str,
    ) -> DashboardResult<T> {
        let response = Self::ensure_success(request.send().await?).await?;
        let body: Value = response.json().await?;
        take_field(body, key)
    }

    async fn check(request: reqwest::RequestBuilder) -> DashboardResult<()> {
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    /// Map a non-2xx response to [`DashboardError::Api`], preferring the
    /// envelope's message over the raw body.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> DashboardResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);
        Err(DashboardError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull `key` out of a success envelope.
pub fn take_field<T: DeserializeOwned>(mut body: Value, key: &str) -> DashboardResult<T> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful");
        return Err(DashboardError::Decode(message.to_string()));
    }
    let value = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| DashboardError::Decode(format!("missing '{key}' in response")))?;
    Ok(serde_json::from_value(value)?)
}
