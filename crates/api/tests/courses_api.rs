//! Faculty and course management for institutions.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get_auth, post_json_auth, put_json_auth, send, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn new_course_is_active_with_all_seats_free() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;

    let course = app
        .create_course(
            &inst,
            json!({ "name": "Data Science", "totalSeats": 30, "requirements": ["Maths"] }),
        )
        .await;

    assert_eq!(course["status"], "ACTIVE");
    assert_eq!(course["totalSeats"], 30);
    assert_eq!(course["availableSeats"], 30);
    assert_eq!(course["institutionId"], inst.uid.as_str());
}

#[tokio::test]
async fn create_course_validates_input() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;

    let response = post_json_auth(
        &app.router,
        "/api/institution/courses",
        &inst.token,
        json!({ "name": "", "totalSeats": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn faculty_name_is_copied_onto_courses() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;

    let response = post_json_auth(
        &app.router,
        "/api/institution/faculties",
        &inst.token,
        json!({ "name": "Engineering" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let faculty_id = body_json(response).await["faculty"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let course = app
        .create_course(
            &inst,
            json!({ "name": "Robotics", "totalSeats": 10, "facultyId": faculty_id }),
        )
        .await;
    assert_eq!(course["faculty"], "Engineering");

    app.create_course(&inst, json!({ "name": "Poetry", "totalSeats": 5 }))
        .await;
    let response = get_auth(
        &app.router,
        &format!("/api/institution/courses?faculty={faculty_id}&search=&status="),
        &inst.token,
    )
    .await;
    let courses = body_json(response).await["courses"].clone();
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["name"], "Robotics");

    let response = get_auth(&app.router, "/api/institution/faculties", &inst.token).await;
    assert_eq!(
        body_json(response).await["faculties"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn search_and_status_filters_apply() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let physics = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    app.create_course(&inst, json!({ "name": "Chemistry", "totalSeats": 5 }))
        .await;

    let response = get_auth(
        &app.router,
        "/api/institution/courses?search=phys",
        &inst.token,
    )
    .await;
    let courses = body_json(response).await["courses"].clone();
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["id"], physics["id"]);

    let id = physics["id"].as_str().unwrap();
    put_json_auth(
        &app.router,
        &format!("/api/institution/courses/{id}/status"),
        &inst.token,
        json!({ "status": "inactive" }),
    )
    .await;
    let response = get_auth(
        &app.router,
        "/api/institution/courses?status=INACTIVE",
        &inst.token,
    )
    .await;
    let courses = body_json(response).await["courses"].clone();
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["name"], "Physics");
}

/// PUT with no body at all.
async fn toggle(app: &TestApp, uri: &str, token: &str) -> serde_json::Value {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["course"]["status"].clone()
}

#[tokio::test]
async fn toggling_status_twice_restores_it() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let uri = format!(
        "/api/institution/courses/{}/status",
        course["id"].as_str().unwrap()
    );

    assert_eq!(toggle(&app, &uri, &inst.token).await, "INACTIVE");
    assert_eq!(toggle(&app, &uri, &inst.token).await, "ACTIVE");

    // An empty JSON object also toggles.
    let response = put_json_auth(&app.router, &uri, &inst.token, json!({})).await;
    assert_eq!(body_json(response).await["course"]["status"], "INACTIVE");
}

#[tokio::test]
async fn seat_total_changes_shift_availability() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 2 }))
        .await;
    let id = course["id"].as_str().unwrap();

    // Fill one seat through an accepted application.
    let student = app.signup("stu@uni.ac", "student").await;
    let application = app.apply(&student, id).await;
    let response = put_json_auth(
        &app.router,
        &format!(
            "/api/institution/applications/{}/review",
            application["id"].as_str().unwrap()
        ),
        &inst.token,
        json!({ "status": "ACCEPTED" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/institution/courses/{id}");
    let response = put_json_auth(&app.router, &uri, &inst.token, json!({ "totalSeats": 5 })).await;
    let json = body_json(response).await;
    assert_eq!(json["course"]["totalSeats"], 5);
    assert_eq!(json["course"]["availableSeats"], 4);

    let response = put_json_auth(&app.router, &uri, &inst.token, json!({ "totalSeats": 0 })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn other_institutions_courses_are_hidden() {
    let app = TestApp::new();
    let owner = app.signup("a@uni.ac", "institution").await;
    let other = app.signup("b@uni.ac", "institution").await;
    let course = app
        .create_course(&owner, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    let uri = format!("/api/institution/courses/{}", course["id"].as_str().unwrap());

    let response = get_auth(&app.router, &uri, &other.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], false);

    let response = send(
        &app.router,
        Method::PUT,
        &format!("{uri}/status"),
        Some(&other.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(&app.router, "/api/institution/courses", &other.token).await;
    assert!(body_json(response).await["courses"]
        .as_array()
        .unwrap()
        .is_empty());
}
