mod common;

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use careers_core::reconnect::ReconnectPolicy;
use careers_core::roles::Role;
use careers_dashboard::chat::{ChatSocket, ServerFrame};
use careers_dashboard::models::Notice;
use careers_dashboard::session::{supervise, Session};
use careers_dashboard::stream::NotificationStream;
use futures::{stream, SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use common::{authorized, client, serve};

async fn notification_stream(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return axum::http::StatusCode::UNAUTHORIZED.into_response();
    }
    let events = [
        json!({"type": "application", "title": "Application update", "message": "Accepted"}),
        json!({"type": "event", "title": "New event", "message": "Career fair"}),
    ];
    let stream = stream::iter(events).map(|data| Event::default().json_data(data));
    Sse::new(stream).into_response()
}

#[tokio::test]
async fn notification_stream_delivers_parsed_notices() {
    let base = serve(Router::new().route(
        "/api/student/notifications/stream",
        get(notification_stream),
    ))
    .await;

    let (stream, mut notices) =
        NotificationStream::new(&client(&base), Role::Student, Duration::from_secs(5)).unwrap();

    // The fixture stream ends after two events, which counts as a clean close.
    stream.run_once().await.unwrap();

    assert_eq!(
        notices.recv().await,
        Some(Notice {
            notice_type: "application".into(),
            title: "Application update".into(),
            message: "Accepted".into(),
        })
    );
    assert_eq!(notices.recv().await.map(|n| n.title), Some("New event".to_string()));
}

#[tokio::test]
async fn rejected_stream_is_a_failed_attempt() {
    let base = serve(Router::new().route(
        "/api/institution/notifications/stream",
        get(notification_stream),
    ))
    .await;
    let anonymous =
        careers_dashboard::client::ApiClient::new(&base, "wrong", Duration::from_secs(5)).unwrap();
    let (stream, _notices) =
        NotificationStream::new(&anonymous, Role::Institution, Duration::from_secs(5)).unwrap();

    let err = stream.run_once().await.unwrap_err();
    assert!(err.is_unauthorized());
}

/// Echo server: answers every chat frame with a stored-message frame.
async fn chat_echo(socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let mut next_id = 0;
    while let Some(Ok(msg)) = stream.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        next_id += 1;
        let reply = json!({
            "type": "chat",
            "id": format!("m{next_id}"),
            "senderId": "inst",
            "recipientId": frame["recipientId"],
            "content": frame["content"],
            "timestamp": "2026-04-01T10:00:00Z"
        });
        if sink.send(Message::Text(reply.to_string().into())).await.is_err() {
            break;
        }
    }
}

#[tokio::test]
async fn chat_socket_sends_and_receives_frames() {
    let base = serve(Router::new().route(
        "/ws",
        get(|ws: WebSocketUpgrade| async move { ws.on_upgrade(chat_echo) }),
    ))
    .await;
    let ws_url = format!("{}/ws", base.replacen("http", "ws", 1));

    let (socket, handle, mut frames) = ChatSocket::new(&ws_url, common::TOKEN);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            supervise(&socket, &ReconnectPolicy::fixed(Duration::from_millis(50)), &cancel).await
        })
    };

    assert!(handle.send_message("s1", "Hello there").await.unwrap());
    let frame = tokio::time::timeout(Duration::from_secs(5), frames.recv())
        .await
        .expect("frame within timeout")
        .expect("channel open");

    match frame {
        ServerFrame::Chat {
            recipient_id,
            content,
            ..
        } => {
            assert_eq!(recipient_id, "s1");
            assert_eq!(content, "Hello there");
        }
        other => panic!("unexpected frame {other:?}"),
    }

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn empty_stream_closes_cleanly() {
    let base = serve(Router::new().route(
        "/api/student/notifications/stream",
        get(|| async {
            Sse::new(stream::empty::<Result<Event, Infallible>>()).into_response()
        }),
    ))
    .await;
    let (stream, mut notices) =
        NotificationStream::new(&client(&base), Role::Student, Duration::from_secs(5)).unwrap();

    stream.run_once().await.unwrap();
    drop(stream);
    assert_eq!(notices.recv().await, None);
}
