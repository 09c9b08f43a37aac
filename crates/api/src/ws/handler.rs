use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use careers_core::error::CoreError;
use careers_core::roles::Role;
use careers_core::types::DocId;
use futures::{SinkExt, StreamExt};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::chat::{accept_chat, parse_frame, ClientFrame, ServerFrame};

/// HTTP handler that upgrades an authenticated request to a chat socket.
///
/// The token comes from `?token=` (browsers cannot set headers on a
/// WebSocket). Requests without a valid token or role never upgrade.
pub async fn ws_handler(
    user: AuthUser,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let role = user
        .role
        .ok_or_else(|| AppError::Core(CoreError::Forbidden("Unauthorized role".into())))?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user.uid, role)))
}

/// Manage a single chat socket after upgrade.
///
/// The socket is registered under the user's id and split: a writer task
/// drains the registry queue into the sink while inbound chat frames are
/// handled here until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState, uid: DocId, role: Role) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, uid = %uid, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), uid.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_text(&state, &conn_id, &uid, role, text.as_str()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&uid, &conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, uid = %uid, "WebSocket disconnected");
}

/// Process one inbound text frame. Failures are reported to the sending
/// connection only; the socket stays open.
async fn handle_text(state: &AppState, conn_id: &str, uid: &str, role: Role, text: &str) {
    let outcome = match parse_frame(text) {
        Ok(ClientFrame::Chat {
            recipient_id,
            content,
        }) => accept_chat(&state.pool, uid, role, &recipient_id, &content).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(message) => {
            let recipient = message.recipient_id.clone();
            let frame = Message::Text(ServerFrame::from(message).to_text().into());
            let delivered = state.ws_manager.send_to_user(&recipient, frame.clone()).await;
            state.ws_manager.send_to_user(uid, frame).await;
            tracing::debug!(sender = %uid, recipient = %recipient, delivered, "Chat message sent");
        }
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Chat frame rejected");
            let frame = ServerFrame::error(e.to_string());
            state
                .ws_manager
                .send_to_connection(uid, conn_id, Message::Text(frame.to_text().into()))
                .await;
        }
    }
}
