//! HTML fragments for each dashboard view.
//!
//! Renderers take a view by reference and return markup for its
//! containers. Every interpolated value goes through [`escape`], so
//! names, notes and messages typed by users cannot inject markup.

use careers_core::status::CourseStatus;
use careers_core::time_ago::time_ago;
use careers_core::types::Timestamp;
use careers_db::models::activity::Activity;
use careers_db::models::application::ApplicationDocument;
use careers_db::models::chat::ChatMessage;
use careers_db::models::course::Course;
use careers_db::models::user::AcademicRecord;

use crate::format::{
    format_date, format_event_date, format_percent, format_time, GpaIndicator,
};
use crate::models::{
    AdmissionRow, ApplicationRow, CourseRecommendation, EventCard, JobRecommendation, Notice,
    StudentListing,
};
use crate::views::{
    AdmissionsTracker, ApplicationReview, CourseManager, StudentConnections, StudentDashboard,
};

pub const DEFAULT_AVATAR: &str = "../img/default-avatar.png";

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Font Awesome icon for an activity or notification type.
pub fn activity_icon(kind: &str) -> &'static str {
    match kind {
        "application" => "fa-file-alt",
        "admission" => "fa-check-circle",
        "job" => "fa-briefcase",
        "event" => "fa-calendar",
        _ => "fa-info-circle",
    }
}

/// Icon suffix (`fa-file-*`) for a document's file type.
pub fn document_icon(kind: Option<&str>) -> &'static str {
    match kind.map(str::to_ascii_lowercase).as_deref() {
        Some("pdf") => "pdf",
        Some("doc" | "docx") => "word",
        Some("xls" | "xlsx") => "excel",
        Some("jpg" | "jpeg" | "png") => "image",
        _ => "alt",
    }
}

fn status_badge(status: &str) -> String {
    format!(
        r#"<span class="status-badge status-{}">{}</span>"#,
        escape(&status.to_ascii_lowercase()),
        escape(status)
    )
}

fn photo_src(photo: Option<&str>) -> String {
    escape(photo.unwrap_or(DEFAULT_AVATAR))
}

fn no_data(message: &str) -> String {
    format!(r#"<div class="no-data">{}</div>"#, escape(message))
}

fn render_list<T>(items: &[T], empty: &str, render: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return no_data(empty);
    }
    items.iter().map(render).collect()
}

fn render_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!(r#"<div class="toast toast-error">{}</div>"#, escape(e)))
        .collect()
}

fn render_notice(notice: &Notice) -> String {
    format!(
        r#"<div class="toast toast-{kind}"><div class="toast-header"><i class="fas {icon}"></i><span>{title}</span></div><div class="toast-body">{message}</div></div>"#,
        kind = escape(&notice.notice_type),
        icon = activity_icon(&notice.notice_type),
        title = escape(&notice.title),
        message = escape(&notice.message),
    )
}

fn render_gpa(gpa: Option<f64>) -> String {
    match gpa {
        Some(gpa) => {
            let indicator = GpaIndicator::new(gpa);
            format!(
                r#"<div class="gpa-indicator"><div class="gpa-bar" style="width: {:.0}%; background-color: {}">{}</div></div>"#,
                indicator.width, indicator.color, indicator.label
            )
        }
        None => r#"<div class="gpa-indicator">N/A</div>"#.to_string(),
    }
}

fn select_options<'a>(
    placeholder: &str,
    options: impl Iterator<Item = (&'a str, &'a str)>,
    selected: Option<&str>,
) -> String {
    let mut html = format!(r#"<option value="">{}</option>"#, escape(placeholder));
    for (value, label) in options {
        let marker = if Some(value) == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{marker}>{}</option>"#,
            escape(value),
            escape(label)
        ));
    }
    html
}

fn course_options(courses: &[Course], selected: Option<&str>) -> String {
    select_options(
        "All Courses",
        courses.iter().map(|c| (c.id.as_str(), c.name.as_str())),
        selected,
    )
}

// ---- student dashboard ----

fn render_course_recommendation(course: &CourseRecommendation) -> String {
    render_recommendation(&course.id, &course.name, &course.institution, course.match_score, "viewCourse")
}

fn render_job_recommendation(job: &JobRecommendation) -> String {
    render_recommendation(&job.id, &job.title, &job.company, job.match_score, "viewJob")
}

fn render_recommendation(id: &str, title: &str, subtitle: &str, score: u8, action: &str) -> String {
    format!(
        r#"<div class="recommendation-item"><div class="recommendation-content"><h4>{title}</h4><p>{subtitle}</p><div class="match-score"><span class="score">{score}% Match</span><div class="score-bar"><div class="score-fill" style="width: {score}%"></div></div></div></div><div class="recommendation-actions"><button class="btn btn-primary btn-sm" data-action="{action}" data-id="{id}">View Details</button></div></div>"#,
        title = escape(title),
        subtitle = escape(subtitle),
        id = escape(id),
    )
}

fn render_activity(activity: &Activity, now: Timestamp) -> String {
    let action = match (&activity.action_url, &activity.action_text) {
        (Some(url), text) => format!(
            r#"<a href="{}" class="btn btn-secondary btn-sm">{}</a>"#,
            escape(url),
            escape(text.as_deref().unwrap_or("View"))
        ),
        (None, _) => String::new(),
    };
    format!(
        r#"<div class="timeline-item"><div class="timeline-icon {kind}"><i class="fas {icon}"></i></div><div class="timeline-content"><div class="timeline-header"><h4>{title}</h4><span class="timeline-date" title="{ago}">{date}</span></div><p>{description}</p>{action}</div></div>"#,
        kind = escape(&activity.activity_type),
        icon = activity_icon(&activity.activity_type),
        title = escape(&activity.title),
        ago = escape(&time_ago(activity.date, now)),
        date = format_date(activity.date),
        description = escape(&activity.description),
    )
}

fn render_event(card: &EventCard) -> String {
    let event = &card.event;
    let rsvp = if card.can_rsvp {
        format!(
            r#"<button class="btn btn-secondary btn-sm" data-action="rsvpEvent" data-id="{}">RSVP</button>"#,
            escape(&event.id)
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class="event-card"><div class="event-date"><span class="date">{date}</span><span class="time">{time}</span></div><div class="event-details"><h4>{title}</h4><p>{description}</p></div><div class="event-actions"><button class="btn btn-primary btn-sm" data-action="viewEvent" data-id="{id}">View Details</button>{rsvp}</div></div>"#,
        date = format_event_date(event.date),
        time = format_time(event.date),
        title = escape(&event.title),
        description = escape(&event.description),
        id = escape(&event.id),
    )
}

pub fn render_student_dashboard(view: &StudentDashboard) -> String {
    let header = match &view.profile {
        Some(profile) => format!(
            r#"<div class="profile-summary"><img id="studentPhoto" src="{photo}" alt="Profile photo"><h2 id="studentName">{name}</h2><span id="studentStatus">Status: {status}</span></div>"#,
            photo = photo_src(profile.profile.photo.as_deref()),
            name = escape(profile.display_name()),
            status = escape(profile.profile.status.as_deref().unwrap_or("Active")),
        ),
        None => String::new(),
    };
    let stats = format!(
        r#"<div class="stats"><div class="stat-card"><span id="pendingApplications">{}</span> Pending</div><div class="stat-card"><span id="acceptedApplications">{}</span> Accepted</div><div class="stat-card"><span id="totalApplications">{}</span> Total</div></div>"#,
        view.stats.pending, view.stats.accepted, view.stats.total
    );

    format!(
        r#"{errors}<div id="toastContainer">{notices}</div>{header}{stats}<section id="recommendedCourses">{courses}</section><section id="jobMatches">{jobs}</section><section id="activityTimeline">{activity}</section><section id="upcomingEvents">{events}</section>"#,
        errors = render_errors(&view.errors),
        notices = view.notices.iter().map(render_notice).collect::<String>(),
        courses = render_list(&view.courses, "No course recommendations yet", render_course_recommendation),
        jobs = render_list(&view.jobs, "No job matches yet", render_job_recommendation),
        activity = render_list(&view.activities, "No recent activity", |a| render_activity(a, view.now)),
        events = render_list(&view.events, "No upcoming events", render_event),
    )
}

// ---- course manager ----

fn render_course_card(course: &Course) -> String {
    let status = course.status.as_str();
    let toggle = if course.status == CourseStatus::Active {
        r#"<i class="fas fa-pause"></i> Deactivate"#
    } else {
        r#"<i class="fas fa-play"></i> Activate"#
    };
    let fees = course
        .fees
        .map(|f| format!("${f:.2}/year"))
        .unwrap_or_else(|| "Fees not set".to_string());
    format!(
        r#"<div class="course-card {class}" data-id="{id}"><div class="course-header"><h3>{name}</h3>{badge}</div><div class="course-body"><p><i class="fas fa-graduation-cap"></i> {faculty}</p><p><i class="fas fa-clock"></i> {duration}</p><p><i class="fas fa-users"></i> {total} seats</p><p><i class="fas fa-money-bill"></i> {fees}</p></div><div class="course-stats"><div class="stat-item"><span class="stat-label">Applications</span><span class="stat-value">{applications}</span></div><div class="stat-item"><span class="stat-label">Available</span><span class="stat-value">{available}</span></div></div><div class="course-actions"><button class="btn btn-secondary btn-sm" data-action="editCourse" data-id="{id}"><i class="fas fa-edit"></i> Edit</button><button class="btn btn-danger btn-sm" data-action="toggleCourseStatus" data-id="{id}">{toggle}</button></div></div>"#,
        class = status.to_ascii_lowercase(),
        id = escape(&course.id),
        name = escape(&course.name),
        badge = status_badge(status),
        faculty = escape(course.faculty.as_deref().unwrap_or("No faculty")),
        duration = escape(course.duration.as_deref().unwrap_or("Duration not set")),
        total = course.total_seats,
        fees = escape(&fees),
        applications = course.application_count,
        available = course.available_seats,
    )
}

pub fn render_course_manager(view: &CourseManager) -> String {
    let faculties = select_options(
        "All Faculties",
        view.faculties.iter().map(|f| (f.id.as_str(), f.name.as_str())),
        view.filters.faculty.as_deref(),
    );
    format!(
        r#"{errors}<select id="facultyFilter">{faculties}</select><div id="coursesGrid">{courses}</div>"#,
        errors = render_errors(&view.errors),
        courses = render_list(&view.courses, "No courses found", render_course_card),
    )
}

// ---- application review ----

fn render_application(row: &ApplicationRow, now: Timestamp) -> String {
    let app = &row.application;
    format!(
        r#"<div class="application-card {class}" data-id="{id}"><div class="application-header"><div class="student-info"><img src="{photo}" alt="Student photo" class="student-photo"><div><h4>{student}</h4><p>{email}</p></div></div>{badge}</div><div class="application-body"><div class="course-info"><strong>Course:</strong> {course}<br><strong>Faculty:</strong> {faculty}</div><div class="application-details"><div class="detail-item"><span class="detail-label">Applied:</span><span class="detail-value">{applied}</span><span class="time-ago">{ago}</span></div><div class="detail-item"><span class="detail-label">GPA:</span><span class="detail-value">{gpa}</span></div></div></div><div class="application-actions"><button class="btn btn-primary btn-sm" data-action="reviewApplication" data-id="{id}"><i class="fas fa-eye"></i> Review</button><button class="btn btn-secondary btn-sm" data-action="viewDocuments" data-id="{id}"><i class="fas fa-file-alt"></i> Documents</button></div></div>"#,
        class = app.status.as_str().to_ascii_lowercase(),
        id = escape(&app.id),
        photo = photo_src(row.student.photo.as_deref()),
        student = escape(&row.student.name),
        email = escape(&row.student.email),
        badge = status_badge(app.status.as_str()),
        course = escape(&row.course.name),
        faculty = escape(row.course.faculty.as_deref().unwrap_or("-")),
        applied = format_date(app.applied_date),
        ago = escape(&time_ago(app.applied_date, now)),
        gpa = render_gpa(row.student.gpa),
    )
}

fn render_document(doc: &ApplicationDocument) -> String {
    format!(
        r#"<div class="document-item"><i class="fas fa-file-{icon}"></i><span class="document-name">{name}</span><div class="document-actions"><a class="btn btn-secondary btn-sm" href="{url}" target="_blank" rel="noopener"><i class="fas fa-eye"></i></a><a class="btn btn-primary btn-sm" href="{url}" download="{name}"><i class="fas fa-download"></i></a></div></div>"#,
        icon = document_icon(doc.kind.as_deref()),
        name = escape(&doc.name),
        url = escape(&doc.url),
    )
}

pub fn render_application_review(view: &ApplicationReview) -> String {
    let documents = match &view.documents {
        Some((id, docs)) => format!(
            r#"<div id="documentsList" data-application="{}">{}</div>"#,
            escape(id),
            render_list(docs, "No documents uploaded", render_document)
        ),
        None => String::new(),
    };
    format!(
        r#"{errors}<select id="courseFilter">{options}</select><div id="applicationsList">{applications}</div>{documents}"#,
        errors = render_errors(&view.errors),
        options = course_options(&view.courses, view.filters.course.as_deref()),
        applications = render_list(&view.applications, "No applications found", |row| {
            render_application(row, view.now)
        }),
    )
}

// ---- admissions tracker ----

fn render_admission_row(row: &AdmissionRow) -> String {
    let admission = &row.admission;
    format!(
        r#"<tr><td><div class="student-info"><img src="{photo}" alt="Student photo" class="student-photo"><div><div class="student-name">{name}</div><div class="student-email">{email}</div></div></div></td><td>{course}</td><td>{date}</td><td>{badge}</td><td><div class="action-buttons"><button class="btn btn-primary btn-sm" data-action="updateEnrollment" data-id="{id}"><i class="fas fa-user-check"></i> Update</button><button class="btn btn-secondary btn-sm" data-action="viewDetails" data-id="{id}"><i class="fas fa-eye"></i> Details</button></div></td></tr>"#,
        photo = photo_src(row.student.photo.as_deref()),
        name = escape(&row.student.name),
        email = escape(&row.student.email),
        course = escape(&row.course.name),
        date = format_date(admission.admission_date),
        badge = status_badge(admission.status.as_str()),
        id = escape(&admission.id),
    )
}

pub fn render_admissions_tracker(view: &AdmissionsTracker) -> String {
    let rows = if view.admissions.is_empty() {
        r#"<tr><td colspan="5" class="text-center">No admissions found</td></tr>"#.to_string()
    } else {
        view.admissions.iter().map(render_admission_row).collect()
    };
    let trends: String = view
        .trends
        .iter()
        .map(|p| format!(r#"<li data-count="{}">{}: {}</li>"#, p.count, escape(&p.label), p.count))
        .collect();
    let distribution: String = view
        .distribution
        .iter()
        .map(|d| format!(r#"<li data-count="{}">{}: {}</li>"#, d.count, escape(&d.course), d.count))
        .collect();

    format!(
        r#"{errors}<div class="stats"><span id="totalAdmissions">{total}</span><span id="acceptanceRate">{acceptance}</span><span id="enrollmentRate">{enrollment}</span></div><ul id="admissionTrends" data-period="{period}">{trends}</ul><ul id="courseDistribution">{distribution}</ul><select id="courseFilter">{options}</select><table><tbody id="admissionsTable">{rows}</tbody></table>"#,
        errors = render_errors(&view.errors),
        total = view.stats.total,
        acceptance = format_percent(view.stats.acceptance_rate),
        enrollment = format_percent(view.stats.enrollment_rate),
        period = view.period.as_str(),
        options = course_options(&view.courses, view.filters.course.as_deref()),
    )
}

// ---- student connections ----

fn render_student_card(student: &StudentListing) -> String {
    let status = student.status.as_str();
    let year = student
        .year
        .map(|y| format!("Year {y}"))
        .unwrap_or_default();
    format!(
        r#"<div class="student-card {class}" data-id="{id}"><div class="student-header"><img src="{photo}" alt="{name}" class="student-photo"><span class="status-indicator {online}"></span></div><div class="student-info"><h4>{name}</h4><p>{course}</p><p>{year}</p>{badge}</div><div class="student-actions"><button class="btn btn-primary btn-sm" data-action="startChat" data-id="{id}"><i class="fas fa-comment"></i> Message</button><button class="btn btn-secondary btn-sm" data-action="viewStudentDetails" data-id="{id}"><i class="fas fa-user"></i> Profile</button></div></div>"#,
        class = status.to_ascii_lowercase(),
        id = escape(&student.student.id),
        photo = photo_src(student.student.photo.as_deref()),
        name = escape(&student.student.name),
        online = if student.is_online { "online" } else { "offline" },
        course = escape(student.course_name.as_deref().unwrap_or("")),
        year = escape(&year),
        badge = status_badge(status),
    )
}

fn render_message(message: &ChatMessage, student_id: &str) -> String {
    let direction = if message.sender_id == student_id {
        "received"
    } else {
        "sent"
    };
    format!(
        r#"<div class="message {direction}"><div class="message-content">{content}</div><div class="message-time">{time}</div></div>"#,
        content = escape(&message.content),
        time = format_time(message.timestamp),
    )
}

fn render_academic_record(record: &AcademicRecord) -> String {
    let gpa = record
        .gpa
        .map(|g| format!("GPA: {g:.2}"))
        .unwrap_or_default();
    let courses: String = record
        .courses
        .iter()
        .map(|c| {
            format!(
                r#"<div class="course-item"><span class="course-name">{}</span><span class="course-grade">{}</span></div>"#,
                escape(&c.name),
                escape(&c.grade)
            )
        })
        .collect();
    format!(
        r#"<div class="academic-record"><div class="semester-info"><strong>Semester {}</strong><span class="gpa">{}</span></div><div class="courses-list">{}</div></div>"#,
        escape(&record.semester),
        gpa,
        courses
    )
}

pub fn render_student_connections(view: &StudentConnections) -> String {
    let chat = match &view.chat {
        Some(thread) => format!(
            r#"<div id="chatSection" data-student="{}"><div id="chatMessages">{}</div></div>"#,
            escape(&thread.student_id),
            thread
                .messages
                .iter()
                .map(|m| render_message(m, &thread.student_id))
                .collect::<String>()
        ),
        None => String::new(),
    };
    let detail = match &view.detail {
        Some(detail) => {
            let student = &detail.listing.student;
            format!(
                r#"<div id="studentDetailsModal"><img id="studentPhoto" src="{photo}" alt="Student photo"><h3 id="studentName">{name}</h3><p id="studentEmail">{email}</p>{badge}<div id="academicRecords">{records}</div><div id="communicationHistory">{comms}</div></div>"#,
                photo = photo_src(student.photo.as_deref()),
                name = escape(&student.name),
                email = escape(&student.email),
                badge = status_badge(detail.listing.status.as_str()),
                records = detail
                    .academics
                    .iter()
                    .map(render_academic_record)
                    .collect::<String>(),
                comms = detail
                    .communications
                    .iter()
                    .map(|m| render_message(m, &student.id))
                    .collect::<String>(),
            )
        }
        None => String::new(),
    };

    format!(
        r#"{errors}<div id="notificationsContainer">{notices}</div><select id="courseFilter">{options}</select><div id="studentsGrid">{students}</div>{chat}{detail}"#,
        errors = render_errors(&view.errors),
        notices = view.notices.iter().map(render_notice).collect::<String>(),
        options = course_options(&view.courses, view.filters.course.as_deref()),
        students = render_list(&view.students, "No students found", render_student_card),
    )
}
