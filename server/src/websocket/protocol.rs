//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded and use snake_case for field names.

use marksync_engine::BookmarkRecord;
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the token's current bookmark set.
    Get {
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to a get request.
    Snapshot {
        bookmarks: Vec<BookmarkRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Push notification after any change to the subscribed token's set.
    BookmarksChanged {
        /// Client-chosen label of the device that made the change
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        /// The whole set after the change
        bookmarks: Vec<BookmarkRecord>,
    },

    /// Response to ping.
    Pong,

    /// Error message.
    Error {
        /// Error description
        message: String,
        /// Request ID from the original request (if applicable)
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerMessage {
    /// Create an error message.
    pub fn error(message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            request_id,
        }
    }

    /// Create a bookmarks_changed push notification.
    pub fn bookmarks_changed(source: Option<String>, bookmarks: Vec<BookmarkRecord>) -> Self {
        ServerMessage::BookmarksChanged { source, bookmarks }
    }
}
