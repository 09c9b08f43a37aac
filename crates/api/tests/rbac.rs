//! Authentication and role gates on the `/api/{role}` trees.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{body_json, get, get_auth, send, CountingStore, TestApp};
use serde_json::json;

#[tokio::test]
async fn missing_token_is_rejected_before_any_store_access() {
    let store = Arc::new(CountingStore::default());
    let app = TestApp::with_options(store.clone(), true);

    let before = store.calls();
    let response = send(
        &app.router,
        Method::PUT,
        "/api/institution/courses/some-id/status",
        None,
        Some(json!({ "status": "INACTIVE" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No authorization token provided");
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(store.calls(), before);
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = TestApp::new();
    let response = get_auth(&app.router, "/api/student/profile", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn wrong_role_gets_403_and_nothing_changes() {
    let app = TestApp::new();
    let institution = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&institution, json!({ "name": "Physics", "totalSeats": 3 }))
        .await;
    let id = course["id"].as_str().unwrap();

    let response = send(
        &app.router,
        Method::PUT,
        &format!("/api/institution/courses/{id}/status"),
        Some(&student.token),
        Some(json!({ "status": "INACTIVE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Unauthorized role");

    let response = get_auth(
        &app.router,
        &format!("/api/institution/courses/{id}"),
        &institution.token,
    )
    .await;
    assert_eq!(body_json(response).await["course"]["status"], "ACTIVE");
}

#[tokio::test]
async fn each_role_is_confined_to_its_tree() {
    let app = TestApp::new();
    let company = app.signup("hr@corp.com", "company").await;
    let student = app.signup("stu@uni.ac", "student").await;

    let response = get_auth(&app.router, "/api/student/profile", &company.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app.router, "/api/company/jobs", &student.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app.router, "/api/company/jobs", &company.token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_query_parameter_is_accepted() {
    let app = TestApp::new();
    let student = app.signup("stu@uni.ac", "student").await;

    let response = get(
        &app.router,
        &format!("/api/student/notifications?token={}", student.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["notifications"].is_array());
}
