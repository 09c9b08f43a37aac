//! Repository behaviour over the in-memory store.
//!
//! Covers seat accounting under concurrent reservations, the status
//! toggle, application lookups, admissions withdrawal, RSVPs and chat
//! history ordering.

use std::sync::Arc;

use assert_matches::assert_matches;
use careers_core::roles::Role;
use careers_core::status::{AdmissionStatus, ApplicationStatus, CourseStatus};
use careers_db::models::course::CreateCourse;
use careers_db::models::event::CreateEvent;
use careers_db::repositories::{
    AdmissionRepo, ApplicationRepo, ChatRepo, CourseRepo, EventRepo, RsvpOutcome,
    SeatReservation, UserRepo,
};
use careers_db::{DbPool, MemoryStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pool() -> DbPool {
    Arc::new(MemoryStore::new())
}

fn new_course(name: &str, seats: u32) -> CreateCourse {
    CreateCourse {
        name: name.to_string(),
        faculty_id: None,
        code: None,
        description: String::new(),
        duration: None,
        total_seats: seats,
        fees: None,
        requirements: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_course_is_active_with_all_seats() {
    let pool = pool();
    let course = CourseRepo::create(&pool, "inst-1", &new_course("Physics", 30), None)
        .await
        .unwrap();

    assert!(!course.id.is_empty());
    assert_eq!(course.status, CourseStatus::Active);
    assert_eq!(course.available_seats, 30);

    let owned = CourseRepo::find_owned(&pool, &course.id, "inst-1").await.unwrap();
    assert!(owned.is_some());
    let foreign = CourseRepo::find_owned(&pool, &course.id, "inst-2").await.unwrap();
    assert!(foreign.is_none());
}

#[tokio::test]
async fn toggling_status_twice_restores_it() {
    let pool = pool();
    let course = CourseRepo::create(&pool, "inst-1", &new_course("Art", 5), None)
        .await
        .unwrap();

    let once = CourseRepo::set_status(&pool, &course.id, None).await.unwrap().unwrap();
    assert_eq!(once.status, CourseStatus::Inactive);
    let twice = CourseRepo::set_status(&pool, &course.id, None).await.unwrap().unwrap();
    assert_eq!(twice.status, CourseStatus::Active);

    let explicit = CourseRepo::set_status(&pool, &course.id, Some(CourseStatus::Active))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(explicit.status, CourseStatus::Active);
}

#[tokio::test]
async fn seats_never_go_negative() {
    let pool = pool();
    let course = CourseRepo::create(&pool, "inst-1", &new_course("Law", 1), None)
        .await
        .unwrap();

    assert_matches!(
        CourseRepo::reserve_seat(&pool, &course.id).await.unwrap(),
        SeatReservation::Reserved(c) if c.available_seats == 0
    );
    assert_matches!(
        CourseRepo::reserve_seat(&pool, &course.id).await.unwrap(),
        SeatReservation::Full(_)
    );
    assert_matches!(
        CourseRepo::reserve_seat(&pool, "missing").await.unwrap(),
        SeatReservation::NotFound
    );

    // Releasing is capped at the total.
    CourseRepo::release_seat(&pool, &course.id).await.unwrap();
    let after = CourseRepo::release_seat(&pool, &course.id).await.unwrap().unwrap();
    assert_eq!(after.available_seats, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_respect_capacity() {
    let pool = pool();
    let course = CourseRepo::create(&pool, "inst-1", &new_course("Medicine", 3), None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..12 {
        let pool = Arc::clone(&pool);
        let id = course.id.clone();
        handles.push(tokio::spawn(async move {
            CourseRepo::reserve_seat(&pool, &id).await
        }));
    }

    let mut reserved = 0;
    for handle in handles {
        if let Ok(SeatReservation::Reserved(_)) = handle.await.unwrap() {
            reserved += 1;
        }
    }

    let final_course = CourseRepo::find_by_id(&pool, &course.id).await.unwrap().unwrap();
    assert!(reserved <= 3);
    assert_eq!(final_course.available_seats, 3 - reserved);
}

// ---------------------------------------------------------------------------
// Applications and admissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn active_application_lookup_ignores_rejected() {
    let pool = pool();
    let app = ApplicationRepo::create(&pool, "stu-1", "course-1", "inst-1", Vec::new())
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Pending);

    let found = ApplicationRepo::find_active_for_course(&pool, "stu-1", "course-1")
        .await
        .unwrap();
    assert!(found.is_some());

    let current = ApplicationRepo::find_owned(&pool, &app.id, "inst-1")
        .await
        .unwrap()
        .unwrap();
    ApplicationRepo::record_review(
        &pool,
        &current.value,
        current.version,
        ApplicationStatus::Rejected,
        Some("Incomplete".into()),
    )
    .await
    .unwrap();

    let found = ApplicationRepo::find_active_for_course(&pool, "stu-1", "course-1")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn stale_review_is_rejected() {
    let pool = pool();
    let app = ApplicationRepo::create(&pool, "stu-1", "course-1", "inst-1", Vec::new())
        .await
        .unwrap();
    let snapshot = ApplicationRepo::find_owned(&pool, &app.id, "inst-1")
        .await
        .unwrap()
        .unwrap();

    ApplicationRepo::record_review(
        &pool,
        &snapshot.value,
        snapshot.version,
        ApplicationStatus::Accepted,
        None,
    )
    .await
    .unwrap();

    let second = ApplicationRepo::record_review(
        &pool,
        &snapshot.value,
        snapshot.version,
        ApplicationStatus::Accepted,
        None,
    )
    .await;
    assert_matches!(second, Err(careers_db::StoreError::VersionConflict { .. }));
}

#[tokio::test]
async fn withdrawing_admissions_for_application() {
    let pool = pool();
    let app = ApplicationRepo::create(&pool, "stu-1", "course-1", "inst-1", Vec::new())
        .await
        .unwrap();
    let admission = AdmissionRepo::create_for_application(&pool, &app).await.unwrap();
    assert_eq!(admission.status, AdmissionStatus::Admitted);

    assert_eq!(AdmissionRepo::withdraw_for_application(&pool, &app.id).await.unwrap(), 1);
    assert_eq!(AdmissionRepo::withdraw_for_application(&pool, &app.id).await.unwrap(), 0);

    let listed = AdmissionRepo::list_for_institution(&pool, "inst-1").await.unwrap();
    assert_eq!(listed[0].status, AdmissionStatus::Withdrawn);
}

// ---------------------------------------------------------------------------
// Users, events, chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn users_by_ids_and_role() {
    let pool = pool();
    UserRepo::create(&pool, "u1", "a@b.com", Role::Student).await.unwrap();
    UserRepo::create(&pool, "u2", "c@d.com", Role::Institution).await.unwrap();

    let found = UserRepo::find_by_ids(&pool, &["u1".into(), "nope".into()]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "a@b.com");

    let students = UserRepo::list_by_role(&pool, Role::Student).await.unwrap();
    assert_eq!(students.len(), 1);
    assert!(UserRepo::find_by_ids(&pool, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn rsvp_outcomes() {
    let pool = pool();
    let event = EventRepo::create(
        &pool,
        "inst-1",
        &CreateEvent {
            title: "Career fair".into(),
            description: String::new(),
            date: chrono::Utc::now() + chrono::Duration::days(3),
            capacity: Some(1),
        },
    )
    .await
    .unwrap();

    assert_matches!(
        EventRepo::rsvp(&pool, &event.id, "s1").await.unwrap(),
        RsvpOutcome::Accepted(e) if e.rsvps == vec!["s1".to_string()]
    );
    assert_matches!(
        EventRepo::rsvp(&pool, &event.id, "s1").await.unwrap(),
        RsvpOutcome::AlreadyRegistered(_)
    );
    assert_matches!(
        EventRepo::rsvp(&pool, &event.id, "s2").await.unwrap(),
        RsvpOutcome::Full(_)
    );

    let upcoming = EventRepo::list_upcoming(&pool, chrono::Utc::now()).await.unwrap();
    assert_eq!(upcoming.len(), 1);
}

#[tokio::test]
async fn conversation_merges_both_directions() {
    let pool = pool();
    ChatRepo::create(&pool, "s1", Role::Student, "i1", "hello").await.unwrap();
    ChatRepo::create(&pool, "i1", Role::Institution, "s1", "hi there").await.unwrap();
    ChatRepo::create(&pool, "s2", Role::Student, "i1", "other").await.unwrap();

    let history = ChatRepo::conversation(&pool, "i1", "s1").await.unwrap();
    let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hello", "hi there"]);
}
