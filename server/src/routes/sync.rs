//! Sync endpoint routes.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{handle_sync, SyncOutcome, SyncQuery};
use crate::AppState;

/// Create sync routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/sync", get(sync_handler).post(sync_handler))
}

impl IntoResponse for SyncOutcome {
    fn into_response(self) -> Response {
        match self {
            SyncOutcome::Token(token) => Json(token).into_response(),
            SyncOutcome::Bookmarks(bookmarks) => Json(bookmarks).into_response(),
            SyncOutcome::Replaced(ack) => Json(ack).into_response(),
        }
    }
}

/// GET|POST /api/sync?action=... - Token minting and whole-set exchange.
async fn sync_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<SyncQuery>, QueryRejection>,
    body: Bytes,
) -> Result<SyncOutcome> {
    let Query(query) = query?;
    handle_sync(&state, query, body).await
}
