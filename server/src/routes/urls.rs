//! Bookmark endpoint routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use marksync_engine::BookmarkRecord;

use crate::error::Result;
use crate::handlers::{
    handle_get_urls, handle_save_url, handle_search, handle_toggle_pin, handle_update_url,
    PinRequest, SearchParams, SuccessResponse, TokenQuery, UrlRequest,
};
use crate::AppState;

/// Create bookmark routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/urls", get(get_urls).post(save_url))
        .route("/api/urls/update", post(update_url))
        .route("/api/urls/pin", post(toggle_pin))
        .route("/api/urls/search", get(search))
}

/// GET /api/urls - List a token's bookmarks.
async fn get_urls(
    State(state): State<AppState>,
    query: std::result::Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<BookmarkRecord>>> {
    let Query(query) = query?;
    Ok(Json(handle_get_urls(&state, query).await?))
}

/// POST /api/urls - Save one bookmark.
async fn save_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) = payload?;
    Ok(Json(handle_save_url(&state, request).await?))
}

/// POST /api/urls/update - Replace one bookmark by id.
async fn update_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) = payload?;
    Ok(Json(handle_update_url(&state, request).await?))
}

/// POST /api/urls/pin - Flip a bookmark's pinned flag.
async fn toggle_pin(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PinRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) = payload?;
    Ok(Json(handle_toggle_pin(&state, request).await?))
}

/// GET /api/urls/search - Filter a token's bookmarks.
async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<BookmarkRecord>>> {
    let Query(params) = params?;
    Ok(Json(handle_search(&state, params).await?))
}
