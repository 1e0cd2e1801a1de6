//! WebSocket handler for per-token change notifications.
//!
//! A connection subscribes to exactly one token. It receives a
//! `bookmarks_changed` message whenever any HTTP request changes that
//! token's set, and can ask for the current set at any time.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::websocket::{ClientMessage, ServerMessage};
use crate::{AppState, Service};

use super::run_blocking;

/// Handle an established WebSocket connection subscribed to `token`.
pub async fn handle_websocket_connection(socket: WebSocket, state: AppState, token: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn_manager = Arc::clone(&state.conn_manager);
    let conn_id = conn_manager.register(token.clone(), tx);

    tracing::info!(conn_id = %conn_id, "WebSocket client connected");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = process_message(&text, &state.service, &token).await;
                conn_manager.send_to(&conn_id, response);
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!("Binary messages not supported");
            }
            Ok(Message::Ping(data)) => {
                tracing::trace!("Received ping: {} bytes", data.len());
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!("Received pong");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close frame received");
                break;
            }
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    conn_manager.unregister(&conn_id);
    send_task.abort();

    tracing::info!(
        conn_id = %conn_id,
        active_connections = conn_manager.connection_count(),
        "WebSocket client disconnected"
    );
}

/// Process a client message and return a server response.
async fn process_message(text: &str, service: &Arc<Service>, token: &str) -> ServerMessage {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::error(format!("Invalid message format: {}", e), None);
        }
    };

    match client_msg {
        ClientMessage::Get { request_id } => {
            let owned = token.to_string();
            match run_blocking(service, move |svc| svc.get_urls(&owned)).await {
                Ok(bookmarks) => ServerMessage::Snapshot {
                    bookmarks,
                    request_id,
                },
                Err(e) => ServerMessage::error(e.client_message(), request_id),
            }
        }

        ClientMessage::Ping => ServerMessage::Pong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marksync_engine::{DirectoryStore, RecoveryPolicy, SyncService};

    #[tokio::test]
    async fn get_failure_hides_storage_details() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.json"), "not json").unwrap();
        let store = DirectoryStore::open(dir.path(), RecoveryPolicy::Strict).unwrap();
        let service: Arc<Service> = Arc::new(SyncService::new(store.into()));

        let reply = process_message(r#"{"type": "get", "request_id": "r1"}"#, &service, "abc").await;
        match reply {
            ServerMessage::Error {
                message,
                request_id,
            } => {
                assert_eq!(message, "Storage error");
                assert_eq!(request_id.as_deref(), Some("r1"));
            }
            other => panic!("Expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn get_and_ping() {
        let service: Arc<Service> =
            Arc::new(SyncService::new(marksync_engine::MemoryStore::new().into()));
        service
            .save_url("abc", marksync_engine::BookmarkDraft::new("http://a.com", "x"))
            .unwrap();

        match process_message(r#"{"type": "get"}"#, &service, "abc").await {
            ServerMessage::Snapshot { bookmarks, .. } => assert_eq!(bookmarks.len(), 1),
            other => panic!("Expected snapshot, got {:?}", other),
        }
        assert!(matches!(
            process_message(r#"{"type": "ping"}"#, &service, "abc").await,
            ServerMessage::Pong
        ));
        assert!(matches!(
            process_message("nonsense", &service, "abc").await,
            ServerMessage::Error { .. }
        ));
    }
}
