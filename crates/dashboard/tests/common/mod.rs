#![allow(dead_code)]

use std::time::Duration;

use axum::http::HeaderMap;
use axum::Router;
use careers_dashboard::client::ApiClient;

pub const TOKEN: &str = "test-token";

/// Serve `router` on an ephemeral port; returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, TOKEN, Duration::from_secs(5)).unwrap()
}

/// Whether the request carried the test bearer token.
pub fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}
