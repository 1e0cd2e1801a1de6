//! WebSocket connection manager.
//!
//! Tracks active WebSocket connections per token and fans change
//! notifications out to every device subscribed to that token.

use std::sync::Arc;

use dashmap::DashMap;
use marksync_engine::{ChangeListener, SetChange};
use tokio::sync::mpsc;

use super::ServerMessage;

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// A single WebSocket connection.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: String,
    /// Token the connection is subscribed to
    pub token: String,
    /// Channel to send messages to this connection
    pub sender: MessageSender,
}

/// Manages active WebSocket connections.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// All active connections, keyed by connection ID.
    connections: DashMap<String, Connection>,
    /// Index of connections by token for efficient fan-out.
    by_token: DashMap<String, Vec<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            by_token: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection subscribed to `token`.
    ///
    /// Returns the connection ID.
    pub fn register(&self, token: String, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();

        let connection = Connection {
            id: conn_id.clone(),
            token: token.clone(),
            sender,
        };

        self.connections.insert(conn_id.clone(), connection);
        self.by_token
            .entry(token)
            .or_default()
            .push(conn_id.clone());

        tracing::info!(conn_id = %conn_id, "WebSocket connection registered");

        conn_id
    }

    /// Unregister a connection.
    pub fn unregister(&self, conn_id: &str) {
        if let Some((_, conn)) = self.connections.remove(conn_id) {
            if let Some(mut conn_ids) = self.by_token.get_mut(&conn.token) {
                conn_ids.retain(|id| id != conn_id);
                if conn_ids.is_empty() {
                    drop(conn_ids);
                    self.by_token.remove(&conn.token);
                }
            }

            tracing::info!(conn_id = %conn_id, "WebSocket connection unregistered");
        }
    }

    /// Send a message to every connection subscribed to `token`.
    ///
    /// Returns the number of connections that received the message.
    pub fn broadcast_to_token(&self, token: &str, message: ServerMessage) -> usize {
        let conn_ids = match self.by_token.get(token) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut sent_count = 0;
        for conn_id in conn_ids {
            if let Some(conn) = self.connections.get(&conn_id) {
                if conn.sender.send(message.clone()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        tracing::debug!(recipients = sent_count, "Broadcast change to subscribers");

        sent_count
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn_id: &str, message: ServerMessage) -> bool {
        self.connections
            .get(conn_id)
            .map(|conn| conn.sender.send(message).is_ok())
            .unwrap_or(false)
    }

    /// Whether anyone is subscribed to `token`.
    pub fn has_subscribers(&self, token: &str) -> bool {
        self.by_token.contains_key(token)
    }

    /// Get the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of tokens with at least one subscriber.
    pub fn token_count(&self) -> usize {
        self.by_token.len()
    }
}

impl ChangeListener for ConnectionManager {
    /// Runs under the token's lock, so subscribers receive sets in the order
    /// they were committed. Sending on an unbounded channel never blocks.
    fn set_changed(&self, change: SetChange<'_>) {
        if !self.has_subscribers(change.token) {
            return;
        }

        let message = ServerMessage::bookmarks_changed(
            change.source.map(str::to_string),
            change.bookmarks.to_vec(),
        );
        let sent = self.broadcast_to_token(change.token, message);
        tracing::debug!(sent_to = sent, "Notified subscribers of change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let conn_id = manager.register("token-1".to_string(), tx);
        assert_eq!(manager.connection_count(), 1);
        assert_eq!(manager.token_count(), 1);
        assert!(manager.has_subscribers("token-1"));

        manager.unregister(&conn_id);
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.token_count(), 0);
        assert!(!manager.has_subscribers("token-1"));
    }

    #[test]
    fn test_broadcast_is_scoped_to_token() {
        let manager = ConnectionManager::new();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();

        manager.register("token-a".to_string(), tx1);
        manager.register("token-a".to_string(), tx2);
        manager.register("token-b".to_string(), tx3);

        let sent = manager.broadcast_to_token("token-a", ServerMessage::Pong);
        assert_eq!(sent, 2);

        assert!(matches!(rx1.try_recv().unwrap(), ServerMessage::Pong));
        assert!(matches!(rx2.try_recv().unwrap(), ServerMessage::Pong));
        assert!(rx3.try_recv().is_err());

        assert_eq!(manager.broadcast_to_token("token-c", ServerMessage::Pong), 0);
    }

    #[test]
    fn test_set_changed_is_scoped_to_token() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register("token-a".to_string(), tx);

        let record = marksync_engine::BookmarkRecord::new("1", "http://x.com", "tech", "t");
        let bookmarks = vec![record];
        manager.set_changed(SetChange {
            token: "token-a",
            source: Some("laptop"),
            bookmarks: &bookmarks,
        });
        manager.set_changed(SetChange {
            token: "token-b",
            source: None,
            bookmarks: &[],
        });

        match rx.try_recv().unwrap() {
            ServerMessage::BookmarksChanged { source, bookmarks } => {
                assert_eq!(source.as_deref(), Some("laptop"));
                assert_eq!(bookmarks.len(), 1);
            }
            other => panic!("Expected bookmarks_changed, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_to() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn_id = manager.register("token-a".to_string(), tx);

        assert!(manager.send_to(&conn_id, ServerMessage::Pong));
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Pong));
        assert!(!manager.send_to("missing", ServerMessage::Pong));
    }
}
