//! Chat over a real WebSocket connection.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get_auth, Session, TestApp};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, session: &Session) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?token={}", session.token))
        .await
        .expect("websocket handshake");
    socket
}

/// Next JSON text frame, skipping control frames.
async fn next_json(socket: &mut Socket) -> Value {
    let deadline = Duration::from_secs(2);
    loop {
        let msg = tokio::time::timeout(deadline, socket.next())
            .await
            .expect("frame before timeout")
            .expect("socket open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string()))
        .await
        .unwrap();
}

#[tokio::test]
async fn chat_is_delivered_and_echoed() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let addr = serve(&app).await;

    let mut inst_socket = connect(addr, &inst).await;
    let mut student_socket = connect(addr, &student).await;

    send_json(
        &mut student_socket,
        json!({ "type": "chat", "recipientId": inst.uid, "content": "Hello!" }),
    )
    .await;

    let delivered = next_json(&mut inst_socket).await;
    assert_eq!(delivered["type"], "chat");
    assert_eq!(delivered["senderId"], student.uid.as_str());
    assert_eq!(delivered["recipientId"], inst.uid.as_str());
    assert_eq!(delivered["content"], "Hello!");
    assert!(delivered["id"].is_string());

    let echoed = next_json(&mut student_socket).await;
    assert_eq!(echoed["id"], delivered["id"]);

    let response = get_auth(
        &app.router,
        &format!("/api/institution/chat/{}/history", student.uid),
        &inst.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let messages = body_json(response).await["messages"].clone();
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["content"], "Hello!");
}

#[tokio::test]
async fn malformed_frames_get_an_error_and_the_socket_stays_open() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let addr = serve(&app).await;
    let mut socket = connect(addr, &student).await;

    socket
        .send(Message::Text("{not json".to_string()))
        .await
        .unwrap();
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].is_string());

    send_json(&mut socket, json!({ "type": "chat", "recipientId": inst.uid })).await;
    assert_eq!(next_json(&mut socket).await["type"], "error");

    send_json(
        &mut socket,
        json!({ "type": "chat", "recipientId": inst.uid, "content": "still here" }),
    )
    .await;
    let echoed = next_json(&mut socket).await;
    assert_eq!(echoed["type"], "chat");
    assert_eq!(echoed["content"], "still here");
}

#[tokio::test]
async fn connected_students_show_as_online() {
    let app = TestApp::new();
    let inst = app.signup("inst@uni.ac", "institution").await;
    let student = app.signup("stu@uni.ac", "student").await;
    let course = app
        .create_course(&inst, json!({ "name": "Physics", "totalSeats": 5 }))
        .await;
    app.apply(&student, course["id"].as_str().unwrap()).await;
    let addr = serve(&app).await;

    let _socket = connect(addr, &student).await;
    let (router, token) = (&app.router, inst.token.as_str());
    let online = common::eventually(move || async move {
        let response = get_auth(router, "/api/institution/students", token).await;
        body_json(response).await["students"][0]["isOnline"] == true
    })
    .await;
    assert!(online);
}

#[tokio::test]
async fn upgrade_without_token_is_refused() {
    let app = TestApp::new();
    let addr = serve(&app).await;

    let result = connect_async(format!("ws://{addr}/ws")).await;
    assert!(result.is_err());
}
