#![allow(dead_code)]

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use careers_api::auth::local::LocalIdentity;
use careers_api::config::{IdentityConfig, ServerConfig};
use careers_api::notifications::{NotificationHub, NotificationRouter};
use careers_api::router::build_app_router;
use careers_api::state::AppState;
use careers_api::ws::WsManager;
use careers_db::store::{Document, DocumentStore, Query, StoreError};
use careers_db::{DbPool, MemoryStore};
use careers_events::{ActivityRecorder, EventBus};

pub const PASSWORD: &str = "pw123456";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &Path, auto_verify_email: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store_url: "memory://".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        public_base_url: "http://localhost:5001".to_string(),
        identity: IdentityConfig {
            token_secret: "test-secret".to_string(),
            token_expiry_mins: 60,
            auto_verify_email,
        },
    }
}

/// A signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub token: String,
}

/// The full application over a fresh in-memory store, with the background
/// event services running.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub identity: Arc<LocalIdentity>,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Accounts are verified on creation.
    pub fn new() -> Self {
        Self::with_options(Arc::new(MemoryStore::new()), true)
    }

    pub fn with_options(pool: DbPool, auto_verify_email: bool) -> Self {
        let upload_dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(upload_dir.path(), auto_verify_email);

        let identity = Arc::new(LocalIdentity::new(
            config.identity.clone(),
            &config.public_base_url,
        ));
        let ws_manager = Arc::new(WsManager::new());
        let notification_hub = Arc::new(NotificationHub::new());
        let event_bus = Arc::new(EventBus::default());

        tokio::spawn(ActivityRecorder::run(pool.clone(), event_bus.subscribe()));
        tokio::spawn(
            NotificationRouter::new(
                pool.clone(),
                Arc::clone(&notification_hub),
                Arc::clone(&ws_manager),
            )
            .run(event_bus.subscribe()),
        );

        let state = AppState {
            pool,
            identity: identity.clone(),
            config: Arc::new(config.clone()),
            ws_manager,
            notification_hub,
            event_bus,
            shutdown: CancellationToken::new(),
        };
        let router = build_app_router(state.clone(), &config).expect("router");

        Self {
            router,
            state,
            identity,
            upload_dir,
        }
    }

    /// Register, then sign in through `/auth/token`.
    pub async fn signup(&self, email: &str, role: &str) -> Session {
        let response = post_json(
            &self.router,
            "/register",
            serde_json::json!({ "email": email, "password": PASSWORD, "role": role }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "register {email}");
        let uid = body_json(response).await["uid"]
            .as_str()
            .expect("uid")
            .to_string();

        let token = self.token(email).await;
        Session {
            uid,
            email: email.to_string(),
            token,
        }
    }

    pub async fn token(&self, email: &str) -> String {
        let response = post_json(
            &self.router,
            "/auth/token",
            serde_json::json!({ "email": email, "password": PASSWORD }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "token for {email}");
        body_json(response).await["idToken"]
            .as_str()
            .expect("idToken")
            .to_string()
    }

    /// Create a course as `institution` and return its JSON.
    pub async fn create_course(&self, institution: &Session, body: Value) -> Value {
        let response = send(
            &self.router,
            Method::POST,
            "/api/institution/courses",
            Some(&institution.token),
            Some(body),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["course"].clone()
    }

    /// Apply as `student` and return the application JSON.
    pub async fn apply(&self, student: &Session, course_id: &str) -> Value {
        let response = send(
            &self.router,
            Method::POST,
            "/api/student/applications",
            Some(&student.token),
            Some(serde_json::json!({ "courseId": course_id })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["application"].clone()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// Poll `check` until it returns true or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

// ---------------------------------------------------------------------------
// Instrumented store
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`], counting every call. `ping` can be made to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub calls: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.hit();
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, StoreError> {
        self.hit();
        self.inner.set(collection, id, data).await
    }

    async fn add(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
        self.hit();
        self.inner.add(collection, data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError> {
        self.hit();
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.hit();
        self.inner.query(collection, query).await
    }

    async fn compare_and_set(
        &self,
        collection: &str,
        id: &str,
        expected_version: u64,
        data: Value,
    ) -> Result<Document, StoreError> {
        self.hit();
        self.inner
            .compare_and_set(collection, id, expected_version, data)
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.hit();
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".into()));
        }
        self.inner.ping().await
    }
}
