//! Per-view dashboard state.
//!
//! Each page of the dashboards is a struct owning the data it shows and
//! the filters that produced it. `load` runs the page's fetches
//! concurrently and returns once all of them have settled; a failed
//! section leaves its data empty and records a message in `errors`
//! instead of failing the whole page.

use careers_core::roles::Role;
use careers_core::status::{AdmissionStatus, ApplicationStatus};
use careers_core::types::{DocId, Timestamp};
use careers_db::models::activity::Activity;
use careers_db::models::application::ApplicationDocument;
use careers_db::models::chat::ChatMessage;
use careers_db::models::course::Course;
use careers_db::models::faculty::Faculty;
use chrono::Utc;

use crate::chat::ServerFrame;
use crate::client::{ApiClient, PhotoUpload, ProfileForm};
use crate::error::DashboardResult;
use crate::filters::{
    AdmissionFilters, ApplicationFilters, CourseFilters, StudentFilters, TrendPeriod,
};
use crate::models::{
    AdmissionRow, AdmissionStats, ApplicationRow, ApplicationStats, CourseRecommendation,
    DistributionEntry, EventCard, JobRecommendation, Notice, StudentDetail, StudentListing,
    StudentProfile, TrendPoint,
};

/// Most live notices a view keeps.
pub const MAX_NOTICES: usize = 20;

/// Keep a section's data, or log and record the failure.
fn settle<T: Default>(errors: &mut Vec<String>, section: &str, result: DashboardResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(section, error = %e, "Dashboard section failed to load");
            errors.push(format!("Failed to load {section}"));
            T::default()
        }
    }
}

fn push_notice(notices: &mut Vec<Notice>, notice: Notice) {
    notices.insert(0, notice);
    notices.truncate(MAX_NOTICES);
}

// ---- student ----

#[derive(Debug, Default)]
pub struct StudentDashboard {
    pub profile: Option<StudentProfile>,
    pub stats: ApplicationStats,
    pub courses: Vec<CourseRecommendation>,
    pub jobs: Vec<JobRecommendation>,
    pub activities: Vec<Activity>,
    pub events: Vec<EventCard>,
    pub notices: Vec<Notice>,
    pub errors: Vec<String>,
    /// Reference instant for relative times.
    pub now: Timestamp,
}

impl StudentDashboard {
    pub async fn load(client: &ApiClient) -> Self {
        let (profile, stats, courses, jobs, activities, events) = tokio::join!(
            client.profile(),
            client.application_stats(),
            client.recommended_courses(),
            client.recommended_jobs(),
            client.activity(),
            client.upcoming_events(),
        );

        let mut errors = Vec::new();
        Self {
            profile: settle(&mut errors, "profile", profile.map(Some)),
            stats: settle(&mut errors, "application statistics", stats),
            courses: settle(&mut errors, "course recommendations", courses),
            jobs: settle(&mut errors, "job recommendations", jobs),
            activities: settle(&mut errors, "recent activity", activities),
            events: settle(&mut errors, "upcoming events", events),
            notices: Vec::new(),
            errors,
            now: Utc::now(),
        }
    }

    /// RSVP to an event, then refresh the event list.
    pub async fn rsvp(&mut self, client: &ApiClient, event_id: &str) -> DashboardResult<()> {
        client.rsvp(event_id).await?;
        self.events = client.upcoming_events().await?;
        Ok(())
    }

    pub async fn update_profile(
        &mut self,
        client: &ApiClient,
        form: &ProfileForm,
        photo: Option<PhotoUpload>,
    ) -> DashboardResult<()> {
        self.profile = Some(client.update_profile(form, photo).await?);
        Ok(())
    }

    pub fn push_notice(&mut self, notice: Notice) {
        push_notice(&mut self.notices, notice);
    }
}

// ---- institution: courses ----

#[derive(Debug, Default)]
pub struct CourseManager {
    pub filters: CourseFilters,
    pub faculties: Vec<Faculty>,
    pub courses: Vec<Course>,
    pub errors: Vec<String>,
}

impl CourseManager {
    pub async fn load(client: &ApiClient, filters: CourseFilters) -> Self {
        let (faculties, courses) = tokio::join!(client.faculties(), client.courses(&filters));
        let mut errors = Vec::new();
        Self {
            faculties: settle(&mut errors, "faculties", faculties),
            courses: settle(&mut errors, "courses", courses),
            filters,
            errors,
        }
    }

    pub async fn apply_filters(
        &mut self,
        client: &ApiClient,
        filters: CourseFilters,
    ) -> DashboardResult<()> {
        self.courses = client.courses(&filters).await?;
        self.filters = filters;
        Ok(())
    }

    /// Toggle a course and replace it in place.
    pub async fn toggle_status(&mut self, client: &ApiClient, id: &str) -> DashboardResult<()> {
        let updated = client.toggle_course_status(id).await?;
        if let Some(slot) = self.courses.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }
}

// ---- institution: applications ----

#[derive(Debug, Default)]
pub struct ApplicationReview {
    pub filters: ApplicationFilters,
    /// Options for the course filter.
    pub courses: Vec<Course>,
    pub applications: Vec<ApplicationRow>,
    /// Documents of the application whose panel is open.
    pub documents: Option<(DocId, Vec<ApplicationDocument>)>,
    pub errors: Vec<String>,
    pub now: Timestamp,
}

impl ApplicationReview {
    pub async fn load(client: &ApiClient, filters: ApplicationFilters) -> Self {
        let all = CourseFilters::default();
        let (courses, applications) = tokio::join!(
            client.courses(&all),
            client.applications(&filters),
        );
        let mut errors = Vec::new();
        Self {
            courses: settle(&mut errors, "courses", courses),
            applications: settle(&mut errors, "applications", applications),
            filters,
            documents: None,
            errors,
            now: Utc::now(),
        }
    }

    pub async fn apply_filters(
        &mut self,
        client: &ApiClient,
        filters: ApplicationFilters,
    ) -> DashboardResult<()> {
        self.applications = client.applications(&filters).await?;
        self.filters = filters;
        Ok(())
    }

    /// Record a decision, then reload the list with the current filters.
    pub async fn review(
        &mut self,
        client: &ApiClient,
        id: &str,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> DashboardResult<()> {
        client.review_application(id, status, notes).await?;
        self.applications = client.applications(&self.filters).await?;
        Ok(())
    }

    pub async fn show_documents(&mut self, client: &ApiClient, id: &str) -> DashboardResult<()> {
        let documents = client.application_documents(id).await?;
        self.documents = Some((id.to_string(), documents));
        Ok(())
    }
}

// ---- institution: admissions ----

#[derive(Debug, Default)]
pub struct AdmissionsTracker {
    pub stats: AdmissionStats,
    pub period: TrendPeriod,
    pub trends: Vec<TrendPoint>,
    pub distribution: Vec<DistributionEntry>,
    pub filters: AdmissionFilters,
    pub admissions: Vec<AdmissionRow>,
    pub courses: Vec<Course>,
    pub errors: Vec<String>,
}

impl AdmissionsTracker {
    pub async fn load(client: &ApiClient, period: TrendPeriod, filters: AdmissionFilters) -> Self {
        let all = CourseFilters::default();
        let (stats, trends, distribution, admissions, courses) = tokio::join!(
            client.admission_stats(),
            client.admission_trends(period),
            client.admission_distribution(),
            client.recent_admissions(&filters),
            client.courses(&all),
        );
        let mut errors = Vec::new();
        Self {
            stats: settle(&mut errors, "admission statistics", stats),
            period,
            trends: settle(&mut errors, "admission trends", trends),
            distribution: settle(&mut errors, "course distribution", distribution),
            filters,
            admissions: settle(&mut errors, "admissions", admissions),
            courses: settle(&mut errors, "courses", courses),
            errors,
        }
    }

    pub async fn set_period(&mut self, client: &ApiClient, period: TrendPeriod) -> DashboardResult<()> {
        self.trends = client.admission_trends(period).await?;
        self.period = period;
        Ok(())
    }

    pub async fn apply_filters(
        &mut self,
        client: &ApiClient,
        filters: AdmissionFilters,
    ) -> DashboardResult<()> {
        self.admissions = client.recent_admissions(&filters).await?;
        self.filters = filters;
        Ok(())
    }

    /// Change an admission's status, then refresh the list and the stats.
    pub async fn update_enrollment(
        &mut self,
        client: &ApiClient,
        id: &str,
        status: AdmissionStatus,
        notes: Option<&str>,
    ) -> DashboardResult<()> {
        client.update_enrollment(id, status, notes).await?;
        let (admissions, stats) = tokio::try_join!(
            client.recent_admissions(&self.filters),
            client.admission_stats(),
        )?;
        self.admissions = admissions;
        self.stats = stats;
        Ok(())
    }
}

// ---- institution: students ----

/// The open chat thread with one student.
#[derive(Debug, Clone, Default)]
pub struct ChatThread {
    pub student_id: DocId,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Default)]
pub struct StudentConnections {
    pub filters: StudentFilters,
    pub students: Vec<StudentListing>,
    pub courses: Vec<Course>,
    pub detail: Option<StudentDetail>,
    pub chat: Option<ChatThread>,
    pub notices: Vec<Notice>,
    pub errors: Vec<String>,
}

impl StudentConnections {
    pub async fn load(client: &ApiClient, filters: StudentFilters) -> Self {
        let all = CourseFilters::default();
        let (students, courses) = tokio::join!(
            client.students(&filters),
            client.courses(&all),
        );
        let mut errors = Vec::new();
        Self {
            students: settle(&mut errors, "students", students),
            courses: settle(&mut errors, "courses", courses),
            filters,
            errors,
            ..Default::default()
        }
    }

    pub async fn apply_filters(
        &mut self,
        client: &ApiClient,
        filters: StudentFilters,
    ) -> DashboardResult<()> {
        self.students = client.students(&filters).await?;
        self.filters = filters;
        Ok(())
    }

    pub async fn view_student(&mut self, client: &ApiClient, id: &str) -> DashboardResult<()> {
        self.detail = Some(client.student(id).await?);
        Ok(())
    }

    /// Open the chat thread with a student, loading its history.
    pub async fn start_chat(&mut self, client: &ApiClient, student_id: &str) -> DashboardResult<()> {
        let messages = client.chat_history(student_id).await?;
        self.chat = Some(ChatThread {
            student_id: student_id.to_string(),
            messages,
        });
        Ok(())
    }

    /// Apply a frame from the chat socket.
    ///
    /// Chat messages are appended when they belong to the open thread;
    /// notifications become notices. Returns whether anything changed.
    pub fn receive(&mut self, frame: ServerFrame) -> bool {
        match frame {
            ServerFrame::Chat {
                id,
                sender_id,
                recipient_id,
                content,
                timestamp,
            } => {
                let Some(thread) = self.chat.as_mut() else {
                    return false;
                };
                let sender_role = if sender_id == thread.student_id {
                    Role::Student
                } else if recipient_id == thread.student_id {
                    Role::Institution
                } else {
                    return false;
                };
                if thread.messages.iter().any(|m| m.id == id) {
                    return false;
                }
                thread.messages.push(ChatMessage {
                    id,
                    sender_id,
                    sender_role,
                    recipient_id,
                    content,
                    timestamp,
                });
                true
            }
            ServerFrame::Notification { title, message } => {
                push_notice(
                    &mut self.notices,
                    Notice {
                        notice_type: "message".into(),
                        title,
                        message,
                    },
                );
                true
            }
            ServerFrame::Error { message } => {
                self.errors.push(message);
                true
            }
        }
    }
}
