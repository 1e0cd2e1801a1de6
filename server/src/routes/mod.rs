//! HTTP route definitions.

mod health;
mod sync;
mod urls;
mod ws;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(urls::routes())
        .merge(sync::routes())
        .merge(ws::routes())
}
