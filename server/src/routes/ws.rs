//! WebSocket upgrade route.

use axum::{
    extract::{rejection::QueryRejection, ws::WebSocketUpgrade, Query, State},
    response::Response,
    routing::get,
    Router,
};
use marksync_engine::validate_token;
use serde::Deserialize;

use crate::error::Result;
use crate::handlers::{handle_websocket_connection, require_token};
use crate::AppState;

/// Query parameters for the WebSocket endpoint.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
    /// Label of the subscribing device
    #[serde(default)]
    pub source: Option<String>,
}

/// Create WebSocket routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ws", get(ws_handler))
}

/// GET /api/ws?token=... - Subscribe to a token's changes.
async fn ws_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<WsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let Query(query) = query?;
    let token = require_token(query.token)?;
    validate_token(&token)?;

    tracing::debug!(source = ?query.source, "WebSocket upgrade requested");

    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, state, token)))
}
