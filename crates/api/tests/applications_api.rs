//! Student applications, institution review, seat accounting and admissions.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get_auth, post_json_auth, put_json_auth, Session, TestApp};
use serde_json::{json, Value};

async fn review(app: &TestApp, inst: &Session, application_id: &str, status: &str) -> StatusCode {
    put_json_auth(
        &app.router,
        &format!("/api/institution/applications/{application_id}/review"),
        &inst.token,
        json!({ "status": status, "notes": "reviewed" }),
    )
    .await
    .status()
}

async fn course_json(app: &TestApp, inst: &Session, id: &str) -> Value {
    let response = get_auth(
        &app.router,
        &format!("/api/institution/courses/{id}"),
        &inst.token,
    )
    .await;
    body_json(response).await["course"].clone()
}

#[tokio::test]
async fn apply_enforces_open_course_and_single_application() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let course_id = course["id"].as_str().unwrap();

    let application = app.apply(&student, course_id).await;
    assert_eq!(application["status"], "PENDING");
    assert_eq!(application["courseId"], course_id);
    assert_eq!(application["institutionId"], inst.uid.as_str());

    let response = post_json_auth(
        &app.router,
        "/api/student/applications",
        &student.token,
        json!({ "courseId": course_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        &app.router,
        "/api/student/applications",
        &student.token,
        json!({ "courseId": "missing" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let closed = app
        .create_course(&inst, json!({ "name": "Closed", "totalSeats": 5 }))
        .await;
    let closed_id = closed["id"].as_str().unwrap();
    put_json_auth(
        &app.router,
        &format!("/api/institution/courses/{closed_id}/status"),
        &inst.token,
        json!({ "status": "INACTIVE" }),
    )
    .await;
    let response = post_json_auth(
        &app.router,
        "/api/student/applications",
        &student.token,
        json!({ "courseId": closed_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(course_json(&app, &inst, course_id).await["applicationCount"], 1);
}

#[tokio::test]
async fn institution_sees_applications_with_student_and_course() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let application = app.apply(&student, course["id"].as_str().unwrap()).await;

    let response = get_auth(&app.router, "/api/institution/applications", &inst.token).await;
    let list = body_json(response).await["applications"].clone();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], application["id"]);
    assert_eq!(list[0]["student"]["email"], "stu@uni.ac");
    assert_eq!(list[0]["course"]["name"], "Physics");

    let response = get_auth(
        &app.router,
        "/api/institution/applications?status=ACCEPTED",
        &inst.token,
    )
    .await;
    assert!(body_json(response).await["applications"]
        .as_array()
        .unwrap()
        .is_empty());

    let response = get_auth(
        &app.router,
        "/api/institution/applications/export",
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("Student,Email,Course"));
    assert!(lines.next().unwrap().contains("stu@uni.ac"));

    // Other institutions cannot read it.
    let other = app.signup("other@uni.ac", "institution").await;
    let response = get_auth(
        &app.router,
        &format!(
            "/api/institution/applications/{}",
            application["id"].as_str().unwrap()
        ),
        &other.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn acceptance_takes_a_seat_and_revoking_returns_it() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 2 }))
        .await;
    let course_id = course["id"].as_str().unwrap();
    let application = app.apply(&student, course_id).await;
    let app_id = application["id"].as_str().unwrap();

    assert_eq!(review(&app, &inst, app_id, "ACCEPTED").await, StatusCode::OK);
    assert_eq!(course_json(&app, &inst, course_id).await["availableSeats"], 1);

    // Re-accepting does not take a second seat.
    assert_eq!(review(&app, &inst, app_id, "ACCEPTED").await, StatusCode::OK);
    assert_eq!(course_json(&app, &inst, course_id).await["availableSeats"], 1);

    let response = get_auth(&app.router, "/api/institution/admissions/stats", &inst.token).await;
    let stats = body_json(response).await["stats"].clone();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["acceptanceRate"], 100.0);

    assert_eq!(review(&app, &inst, app_id, "REJECTED").await, StatusCode::OK);
    assert_eq!(course_json(&app, &inst, course_id).await["availableSeats"], 2);

    let response = get_auth(&app.router, "/api/institution/admissions/stats", &inst.token).await;
    assert_eq!(body_json(response).await["stats"]["total"], 0);
}

#[tokio::test]
async fn racing_acceptances_never_oversell_seats() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let course = app
        .create_course(&inst, json!({ "name": "Tiny seminar", "totalSeats": 1 }))
        .await;
    let course_id = course["id"].as_str().unwrap();

    let mut application_ids = Vec::new();
    for i in 0..4 {
        let student = app.signup(&format!("s{i}@uni.ac"), "student").await;
        let application = app.apply(&student, course_id).await;
        application_ids.push(application["id"].as_str().unwrap().to_string());
    }

    let reviews = application_ids
        .iter()
        .map(|id| review(&app, &inst, id, "ACCEPTED"));
    let statuses = futures::future::join_all(reviews).await;

    let accepted = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 3);
    assert_eq!(course_json(&app, &inst, course_id).await["availableSeats"], 0);
}

#[tokio::test]
async fn enrollment_updates_and_student_stats() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let physics = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let maths = app
        .create_course(&inst, json!({ "name": "Maths", "totalSeats": 5 }))
        .await;
    let accepted = app.apply(&student, physics["id"].as_str().unwrap()).await;
    app.apply(&student, maths["id"].as_str().unwrap()).await;
    review(&app, &inst, accepted["id"].as_str().unwrap(), "ACCEPTED").await;

    let response = get_auth(&app.router, "/api/student/applications/stats", &student.token).await;
    let stats = body_json(response).await["stats"].clone();
    assert_eq!(stats, json!({ "total": 2, "pending": 1, "accepted": 1, "rejected": 0 }));

    let response = get_auth(&app.router, "/api/institution/admissions/recent", &inst.token).await;
    let admissions = body_json(response).await["admissions"].clone();
    assert_eq!(admissions.as_array().unwrap().len(), 1);
    assert_eq!(admissions[0]["student"]["email"], "stu@uni.ac");
    let admission_id = admissions[0]["id"].as_str().unwrap().to_string();

    let response = put_json_auth(
        &app.router,
        &format!("/api/institution/admissions/{admission_id}/enrollment"),
        &inst.token,
        json!({ "status": "enrolled" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let admission = body_json(response).await["admission"].clone();
    assert_eq!(admission["status"], "ENROLLED");
    assert!(admission["enrollmentDate"].is_string());

    let response = get_auth(&app.router, "/api/institution/admissions/stats", &inst.token).await;
    let stats = body_json(response).await["stats"].clone();
    assert_eq!(stats["enrollmentRate"], 100.0);
    assert_eq!(stats["acceptanceRate"], 50.0);

    let response = get_auth(
        &app.router,
        "/api/institution/admissions/distribution",
        &inst.token,
    )
    .await;
    let distribution = body_json(response).await["distribution"].clone();
    assert_eq!(distribution, json!([{ "course": "Physics", "count": 1 }]));

    let response = get_auth(
        &app.router,
        "/api/institution/admissions/trends?period=weekly",
        &inst.token,
    )
    .await;
    let trends = body_json(response).await["trends"].clone();
    let trends = trends.as_array().unwrap();
    assert_eq!(trends.len(), 8);
    assert_eq!(trends.last().unwrap()["count"], 1);

    let response = post_json_auth(
        &app.router,
        "/api/institution/admissions/report",
        &inst.token,
        json!({ "type": "admissions", "format": "json" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["report"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn students_list_shows_applicants_only() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let applicant = app.signup("stu@uni.ac", "student").await;
    let bystander = app.signup("other@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    app.apply(&applicant, course["id"].as_str().unwrap()).await;

    let response = get_auth(&app.router, "/api/institution/students", &inst.token).await;
    let students = body_json(response).await["students"].clone();
    assert_eq!(students.as_array().unwrap().len(), 1);
    assert_eq!(students[0]["id"], applicant.uid.as_str());
    assert_eq!(students[0]["isOnline"], false);

    let response = get_auth(
        &app.router,
        &format!("/api/institution/students/{}", applicant.uid),
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let student = body_json(response).await["student"].clone();
    assert_eq!(student["applications"].as_array().unwrap().len(), 1);
    assert!(student["communications"].as_array().unwrap().is_empty());

    let response = get_auth(
        &app.router,
        &format!("/api/institution/students/{}", bystander.uid),
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// One institution with an accepted Physics application (and so one
/// admission) from `stu@uni.ac`.
async fn admitted(app: &TestApp) -> (Session, Session, String) {
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let response = post_json_auth(
        &app.router,
        "/api/student/applications",
        &student.token,
        json!({
            "courseId": course["id"],
            "documents": [{ "name": "Transcript", "url": "https://files.example/t.pdf", "kind": "pdf" }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let application_id = body_json(response).await["application"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(review(app, &inst, &application_id, "ACCEPTED").await, StatusCode::OK);
    (inst, student, application_id)
}

fn csv_body(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn documents_are_listed_for_the_owning_institution_only() {
    let app = TestApp::new();
    let (inst, _, application_id) = admitted(&app).await;
    let uri = format!("/api/institution/applications/{application_id}/documents");

    let response = get_auth(&app.router, &uri, &inst.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["documents"][0]["name"], "Transcript");
    assert_eq!(json["documents"][0]["kind"], "pdf");

    let other = app.signup("other@uni.ac", "institution").await;
    let response = get_auth(&app.router, &uri, &other.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn trends_and_distribution_count_live_admissions() {
    let app = TestApp::new();
    let (inst, _, _) = admitted(&app).await;

    let response = get_auth(&app.router, "/api/institution/admissions/trends", &inst.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let trends = body_json(response).await["trends"].as_array().unwrap().clone();
    assert_eq!(trends.len(), 6);
    assert_eq!(trends.last().unwrap()["count"], 1);

    let response = get_auth(
        &app.router,
        "/api/institution/admissions/trends?period=weekly",
        &inst.token,
    )
    .await;
    let trends = body_json(response).await["trends"].as_array().unwrap().clone();
    assert_eq!(trends.len(), 8);
    assert_eq!(trends.last().unwrap()["count"], 1);

    let response = get_auth(
        &app.router,
        "/api/institution/admissions/trends?period=yearly",
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        &app.router,
        "/api/institution/admissions/distribution",
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["distribution"],
        json!([{ "course": "Physics", "count": 1 }])
    );
}

#[tokio::test]
async fn admissions_export_is_a_csv_attachment() {
    let app = TestApp::new();
    let (inst, _, _) = admitted(&app).await;

    let response = get_auth(&app.router, "/api/institution/admissions/export", &inst.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/csv"));
    assert!(headers["content-disposition"]
        .to_str()
        .unwrap()
        .contains("admissions.csv"));

    let lines = csv_body(body_bytes(response).await);
    assert_eq!(lines[0], "Student,Email,Course,Status,Admitted,Enrolled,Notes");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("stu@uni.ac"));
    assert!(lines[1].contains("Physics,ADMITTED"));
}

#[tokio::test]
async fn reports_come_as_csv_or_json() {
    let app = TestApp::new();
    let (inst, _, _) = admitted(&app).await;

    let response = post_json_auth(
        &app.router,
        "/api/institution/admissions/report",
        &inst.token,
        json!({ "type": "applications", "format": "csv" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let lines = csv_body(body_bytes(response).await);
    assert_eq!(lines[0], "Student,Email,Course,Status,Applied");
    assert!(lines[1].contains("ACCEPTED"));

    let response = post_json_auth(
        &app.router,
        "/api/institution/admissions/report",
        &inst.token,
        json!({ "type": "summary", "format": "json" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["report"]["stats"]["total"], 1);
    assert_eq!(json["report"]["distribution"][0]["course"], "Physics");

    let response = post_json_auth(
        &app.router,
        "/api/institution/admissions/report",
        &inst.token,
        json!({ "type": "admissions", "format": "json" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["report"].as_array().unwrap().len(), 1);
    assert_eq!(json["report"][0]["student"]["email"], "stu@uni.ac");

    let response = post_json_auth(
        &app.router,
        "/api/institution/admissions/report",
        &inst.token,
        json!({ "type": "revenue" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
