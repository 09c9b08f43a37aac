//! Institution handlers for `/admissions`: statistics, trends, course
//! distribution, the recent list, enrollment updates, reports and export.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use careers_core::error::CoreError;
use careers_core::search::{matches_search, non_blank, parse_date_bound, Bound, DateRange};
use careers_core::status::{AdmissionStatus, ApplicationStatus};
use careers_core::types::{DocId, Timestamp};
use careers_db::models::admission::{Admission, UpdateEnrollment};
use careers_db::models::course::Course;
use careers_db::models::user::User;
use careers_db::repositories::{AdmissionRepo, ApplicationRepo};
use careers_events::{kinds, PlatformEvent};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::summaries::{
    course_summary, courses_by_id, student_summary, users_by_id, CourseSummary, StudentSummary,
};
use crate::error::{AppError, AppResult};
use crate::export::Csv;
use crate::middleware::rbac::RequireInstitution;
use crate::query::{AdmissionFilter, TrendParams};
use crate::response::Envelope;
use crate::state::AppState;

/// Most admissions returned by the recent list.
const RECENT_LIMIT: usize = 50;
const MONTHLY_BUCKETS: u32 = 6;
const WEEKLY_BUCKETS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionStats {
    /// Admissions that have not been withdrawn.
    pub total: usize,
    /// Accepted applications as a percentage of all applications.
    pub acceptance_rate: f64,
    /// Enrolled admissions as a percentage of non-withdrawn admissions.
    pub enrollment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub course: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AdmissionView {
    #[serde(flatten)]
    pub admission: Admission,
    pub student: StudentSummary,
    pub course: CourseSummary,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: AdmissionStats,
}

#[derive(Debug, Serialize)]
pub struct TrendsPayload {
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Serialize)]
pub struct DistributionPayload {
    pub distribution: Vec<DistributionEntry>,
}

#[derive(Debug, Serialize)]
pub struct AdmissionsPayload {
    pub admissions: Vec<AdmissionView>,
}

#[derive(Debug, Serialize)]
pub struct AdmissionPayload {
    pub admission: Admission,
}

/// Body of `POST /admissions/report`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(rename = "type")]
    pub report_type: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Admissions,
    Applications,
    Summary,
}

impl ReportKind {
    fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admissions" => Ok(Self::Admissions),
            "applications" => Ok(Self::Applications),
            "summary" => Ok(Self::Summary),
            other => Err(CoreError::Validation(format!("Unknown report type '{other}'"))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Admissions => "admissions",
            Self::Applications => "applications",
            Self::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    /// Monthly unless `weekly` is asked for.
    fn parse(raw: Option<String>) -> Result<Self, CoreError> {
        match non_blank(raw).map(|p| p.to_ascii_lowercase()).as_deref() {
            None | Some("monthly") => Ok(Self::Monthly),
            Some("weekly") => Ok(Self::Weekly),
            Some(other) => Err(CoreError::Validation(format!("Unknown period '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pure computations
// ---------------------------------------------------------------------------

/// `part / whole` as a percentage rounded to one decimal; 0 for an empty whole.
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

pub fn compute_stats(
    application_statuses: &[ApplicationStatus],
    admissions: &[Admission],
) -> AdmissionStats {
    let accepted = application_statuses
        .iter()
        .filter(|s| **s == ApplicationStatus::Accepted)
        .count();
    let live: Vec<&Admission> = admissions
        .iter()
        .filter(|a| a.status != AdmissionStatus::Withdrawn)
        .collect();
    let enrolled = live
        .iter()
        .filter(|a| a.status == AdmissionStatus::Enrolled)
        .count();

    AdmissionStats {
        total: live.len(),
        acceptance_rate: percentage(accepted, application_statuses.len()),
        enrollment_rate: percentage(enrolled, live.len()),
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `back` months before `date`'s month.
fn months_back(date: NaiveDate, back: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 - back as i32;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or(date)
}

/// Admission counts per period, oldest bucket first, ending at `now`.
pub fn compute_trends(dates: &[Timestamp], period: Period, now: Timestamp) -> Vec<TrendPoint> {
    let today = now.date_naive();
    let starts: Vec<NaiveDate> = match period {
        Period::Monthly => (0..MONTHLY_BUCKETS)
            .rev()
            .map(|back| months_back(month_start(today), back))
            .collect(),
        Period::Weekly => {
            let this_week =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (0..WEEKLY_BUCKETS)
                .rev()
                .map(|back| this_week - Duration::weeks(back))
                .collect()
        }
    };

    let mut counts = vec![0usize; starts.len()];
    for date in dates.iter().map(|d| d.date_naive()) {
        if date > today {
            continue;
        }
        if let Some(idx) = starts.iter().rposition(|start| date >= *start) {
            counts[idx] += 1;
        }
    }

    starts
        .iter()
        .zip(counts)
        .map(|(start, count)| TrendPoint {
            label: match period {
                Period::Monthly => start.format("%b %Y").to_string(),
                Period::Weekly => start.format("%d %b").to_string(),
            },
            count,
        })
        .collect()
}

/// Live admissions per course name, largest first.
pub fn compute_distribution(
    admissions: &[Admission],
    courses: &HashMap<DocId, Course>,
) -> Vec<DistributionEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for admission in admissions
        .iter()
        .filter(|a| a.status != AdmissionStatus::Withdrawn)
    {
        let name = course_summary(courses, &admission.course_id).name;
        *counts.entry(name).or_default() += 1;
    }
    let mut distribution: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(course, count)| DistributionEntry { course, count })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/institution/admissions/stats
pub async fn stats(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<StatsPayload>>> {
    let statuses: Vec<ApplicationStatus> =
        ApplicationRepo::list_for_institution(&state.pool, &user.uid)
            .await?
            .iter()
            .map(|a| a.status)
            .collect();
    let admissions = AdmissionRepo::list_for_institution(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(StatsPayload {
        stats: compute_stats(&statuses, &admissions),
    })))
}

/// GET /api/institution/admissions/trends?period=weekly|monthly
pub async fn trends(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> AppResult<Json<Envelope<TrendsPayload>>> {
    let period = Period::parse(params.period)?;
    let dates: Vec<Timestamp> = AdmissionRepo::list_for_institution(&state.pool, &user.uid)
        .await?
        .iter()
        .map(|a| a.admission_date)
        .collect();
    Ok(Json(Envelope::ok(TrendsPayload {
        trends: compute_trends(&dates, period, Utc::now()),
    })))
}

/// GET /api/institution/admissions/distribution
pub async fn distribution(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<DistributionPayload>>> {
    let admissions = AdmissionRepo::list_for_institution(&state.pool, &user.uid).await?;
    let courses = courses_by_id(&state.pool, &user.uid).await?;
    Ok(Json(Envelope::ok(DistributionPayload {
        distribution: compute_distribution(&admissions, &courses),
    })))
}

/// Admissions with student and course embedded, filtered, newest first.
async fn admission_views(
    state: &AppState,
    institution_id: &str,
    filter: AdmissionFilter,
    range: DateRange,
) -> AppResult<Vec<AdmissionView>> {
    let search = non_blank(filter.search);
    let course = non_blank(filter.course);
    let status: Option<AdmissionStatus> =
        non_blank(filter.status).map(|s| s.parse()).transpose()?;

    let admissions = AdmissionRepo::list_for_institution(&state.pool, institution_id).await?;
    let users: HashMap<DocId, User> =
        users_by_id(&state.pool, admissions.iter().map(|a| &a.student_id)).await?;
    let courses = courses_by_id(&state.pool, institution_id).await?;

    Ok(admissions
        .into_iter()
        .filter(|a| course.as_deref().map_or(true, |c| c == a.course_id))
        .filter(|a| status.map_or(true, |s| s == a.status))
        .filter(|a| range.contains(a.admission_date))
        .map(|admission| AdmissionView {
            student: student_summary(&users, &admission.student_id),
            course: course_summary(&courses, &admission.course_id),
            admission,
        })
        .filter(|v| {
            search.as_deref().map_or(true, |needle| {
                matches_search(
                    needle,
                    [
                        v.student.name.as_str(),
                        v.student.email.as_str(),
                        v.course.name.as_str(),
                    ],
                )
            })
        })
        .collect())
}

/// GET /api/institution/admissions/recent?search&course&status
pub async fn recent(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<AdmissionFilter>,
) -> AppResult<Json<Envelope<AdmissionsPayload>>> {
    let mut admissions = admission_views(&state, &user.uid, filter, DateRange::default()).await?;
    admissions.truncate(RECENT_LIMIT);
    Ok(Json(Envelope::ok(AdmissionsPayload { admissions })))
}

/// PUT /api/institution/admissions/{id}/enrollment
///
/// Moving to ENROLLED without a date stamps the current time.
pub async fn update_enrollment(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<UpdateEnrollment>,
) -> AppResult<Json<Envelope<AdmissionPayload>>> {
    let existing = AdmissionRepo::find_owned(&state.pool, &id, &user.uid)
        .await?
        .ok_or_else(|| CoreError::not_found("Admission", id.clone()))?;

    let mut enrollment_date = non_blank(input.enrollment_date)
        .map(|d| parse_date_bound(&d, Bound::Start))
        .transpose()?;
    if enrollment_date.is_none()
        && input.status == AdmissionStatus::Enrolled
        && existing.enrollment_date.is_none()
    {
        enrollment_date = Some(Utc::now());
    }

    let admission = AdmissionRepo::update_enrollment(
        &state.pool,
        &id,
        input.status,
        enrollment_date,
        non_blank(input.notes),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(kinds::ADMISSION_UPDATED)
            .with_source("admission", admission.id.clone())
            .with_actor(user.uid.clone())
            .with_recipients(vec![admission.student_id.clone()])
            .with_summary(
                "Admission update",
                format!("Your admission status is now {}", admission.status),
            ),
    );
    tracing::info!(admission = %admission.id, status = %admission.status, "Enrollment updated");
    Ok(Json(Envelope::ok(AdmissionPayload { admission })))
}

fn admissions_csv(views: &[AdmissionView]) -> Csv {
    let mut csv = Csv::new([
        "Student", "Email", "Course", "Status", "Admitted", "Enrolled", "Notes",
    ]);
    for view in views {
        let a = &view.admission;
        csv.push([
            view.student.name.clone(),
            view.student.email.clone(),
            view.course.name.clone(),
            a.status.to_string(),
            a.admission_date.format("%Y-%m-%d").to_string(),
            a.enrollment_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            a.notes.clone().unwrap_or_default(),
        ]);
    }
    csv
}

/// GET /api/institution/admissions/export?search&course&status -- CSV.
pub async fn export(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Query(filter): Query<AdmissionFilter>,
) -> AppResult<Response> {
    let views = admission_views(&state, &user.uid, filter, DateRange::default()).await?;
    tracing::info!(institution = %user.uid, rows = views.len(), "Admissions exported");
    Ok(admissions_csv(&views).into_attachment("admissions.csv"))
}

/// POST /api/institution/admissions/report
///
/// `type` selects admissions, applications or a summary over
/// `[startDate, endDate]`; `format` is `csv` (default) or `json`.
pub async fn report(
    RequireInstitution(user): RequireInstitution,
    State(state): State<AppState>,
    Json(input): Json<ReportRequest>,
) -> AppResult<Response> {
    let kind = ReportKind::parse(&input.report_type)?;
    let range = DateRange::parse(input.start_date, input.end_date)?;
    let as_json = match non_blank(input.format).map(|f| f.to_ascii_lowercase()).as_deref() {
        None | Some("csv") => false,
        Some("json") => true,
        Some(other) => {
            return Err(AppError::bad_request(format!("Unsupported format '{other}'")));
        }
    };
    let filename = format!("{}_report.{}", kind.as_str(), if as_json { "json" } else { "csv" });

    let response = match kind {
        ReportKind::Admissions => {
            let views =
                admission_views(&state, &user.uid, AdmissionFilter::default(), range).await?;
            if as_json {
                Json(Envelope::ok(serde_json::json!({ "report": views }))).into_response()
            } else {
                admissions_csv(&views).into_attachment(&filename)
            }
        }
        ReportKind::Applications => {
            let applications: Vec<_> =
                ApplicationRepo::list_for_institution(&state.pool, &user.uid)
                    .await?
                    .into_iter()
                    .filter(|a| range.contains(a.applied_date))
                    .collect();
            let users = users_by_id(&state.pool, applications.iter().map(|a| &a.student_id)).await?;
            let courses = courses_by_id(&state.pool, &user.uid).await?;
            if as_json {
                Json(Envelope::ok(serde_json::json!({ "report": applications }))).into_response()
            } else {
                let mut csv = Csv::new(["Student", "Email", "Course", "Status", "Applied"]);
                for app in &applications {
                    let student = student_summary(&users, &app.student_id);
                    csv.push([
                        student.name,
                        student.email,
                        course_summary(&courses, &app.course_id).name,
                        app.status.to_string(),
                        app.applied_date.format("%Y-%m-%d").to_string(),
                    ]);
                }
                csv.into_attachment(&filename)
            }
        }
        ReportKind::Summary => {
            let applications: Vec<ApplicationStatus> =
                ApplicationRepo::list_for_institution(&state.pool, &user.uid)
                    .await?
                    .into_iter()
                    .filter(|a| range.contains(a.applied_date))
                    .map(|a| a.status)
                    .collect();
            let admissions: Vec<Admission> =
                AdmissionRepo::list_for_institution(&state.pool, &user.uid)
                    .await?
                    .into_iter()
                    .filter(|a| range.contains(a.admission_date))
                    .collect();
            let courses = courses_by_id(&state.pool, &user.uid).await?;
            let stats = compute_stats(&applications, &admissions);
            let distribution = compute_distribution(&admissions, &courses);
            if as_json {
                Json(Envelope::ok(serde_json::json!({
                    "report": { "stats": stats, "distribution": distribution }
                })))
                .into_response()
            } else {
                let mut csv = Csv::new(["Metric", "Value"]);
                csv.push(["Applications".to_string(), applications.len().to_string()]);
                csv.push(["Admissions".to_string(), stats.total.to_string()]);
                csv.push(["Acceptance rate (%)".to_string(), stats.acceptance_rate.to_string()]);
                csv.push(["Enrollment rate (%)".to_string(), stats.enrollment_rate.to_string()]);
                for entry in &distribution {
                    csv.push([format!("Course: {}", entry.course), entry.count.to_string()]);
                }
                csv.into_attachment(&filename)
            }
        }
    };

    tracing::info!(institution = %user.uid, report = kind.as_str(), json = as_json, "Report generated");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn admission(status: AdmissionStatus, course: &str) -> Admission {
        Admission {
            id: "a".into(),
            application_id: "app".into(),
            student_id: "s".into(),
            course_id: course.into(),
            institution_id: "i".into(),
            status,
            admission_date: at(2024, 3, 1),
            enrollment_date: None,
            notes: None,
        }
    }

    #[test]
    fn stats_round_to_one_decimal_and_ignore_withdrawn() {
        let statuses = [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Pending,
        ];
        let admissions = [
            admission(AdmissionStatus::Enrolled, "c1"),
            admission(AdmissionStatus::Admitted, "c1"),
            admission(AdmissionStatus::Admitted, "c2"),
            admission(AdmissionStatus::Withdrawn, "c2"),
        ];
        let stats = compute_stats(&statuses, &admissions);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.acceptance_rate, 33.3);
        assert_eq!(stats.enrollment_rate, 33.3);
    }

    #[test]
    fn empty_inputs_give_zero_rates() {
        let stats = compute_stats(&[], &[]);
        assert_eq!(
            stats,
            AdmissionStats {
                total: 0,
                acceptance_rate: 0.0,
                enrollment_rate: 0.0
            }
        );
    }

    #[test]
    fn monthly_trends_cover_six_months_with_labels() {
        let now = at(2024, 3, 15);
        let dates = [at(2024, 3, 1), at(2024, 3, 10), at(2024, 1, 31), at(2023, 6, 1)];
        let trends = compute_trends(&dates, Period::Monthly, now);
        assert_eq!(trends.len(), 6);
        assert_eq!(trends[0].label, "Oct 2023");
        assert_eq!(trends[5].label, "Mar 2024");
        assert_eq!(trends[5].count, 2);
        assert_eq!(trends[3].count, 1);
        assert_eq!(trends.iter().map(|t| t.count).sum::<usize>(), 3);
    }

    #[test]
    fn weekly_trends_start_on_monday() {
        // 2024-03-13 is a Wednesday.
        let now = at(2024, 3, 13);
        let dates = [at(2024, 3, 11), at(2024, 3, 10)];
        let trends = compute_trends(&dates, Period::Weekly, now);
        assert_eq!(trends.len(), 8);
        assert_eq!(trends[7].label, "11 Mar");
        assert_eq!(trends[7].count, 1);
        assert_eq!(trends[6].count, 1);
    }

    #[test]
    fn period_defaults_to_monthly() {
        assert_eq!(Period::parse(None).unwrap(), Period::Monthly);
        assert_eq!(Period::parse(Some("".into())).unwrap(), Period::Monthly);
        assert_eq!(Period::parse(Some("Weekly".into())).unwrap(), Period::Weekly);
        assert!(Period::parse(Some("daily".into())).is_err());
    }

    #[test]
    fn distribution_counts_live_admissions_per_course() {
        let now = Utc::now();
        let mut courses = HashMap::new();
        for (id, name) in [("c1", "Nursing"), ("c2", "Law")] {
            courses.insert(
                id.to_string(),
                Course {
                    id: id.into(),
                    institution_id: "i".into(),
                    name: name.into(),
                    faculty_id: None,
                    faculty: None,
                    code: None,
                    description: String::new(),
                    duration: None,
                    total_seats: 10,
                    available_seats: 10,
                    fees: None,
                    requirements: vec![],
                    status: careers_core::status::CourseStatus::Active,
                    application_count: 0,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        let admissions = [
            admission(AdmissionStatus::Admitted, "c1"),
            admission(AdmissionStatus::Enrolled, "c1"),
            admission(AdmissionStatus::Admitted, "c2"),
            admission(AdmissionStatus::Withdrawn, "c2"),
        ];
        let distribution = compute_distribution(&admissions, &courses);
        assert_eq!(
            distribution,
            vec![
                DistributionEntry { course: "Nursing".into(), count: 2 },
                DistributionEntry { course: "Law".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn report_kind_parsing() {
        assert_eq!(ReportKind::parse("Summary").unwrap(), ReportKind::Summary);
        assert!(ReportKind::parse("finance").is_err());
    }
}
