//! marksync server - HTTP and WebSocket front end for bookmark sync.
//!
//! This crate exposes the marksync-engine [`SyncService`] over HTTP for
//! browser clients, and pushes change notifications to devices subscribed to
//! a token over WebSocket.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;
pub mod websocket;

use crate::config::Config;
use crate::websocket::ConnectionManager;
use axum::Router;
use marksync_engine::{AnyStore, SyncService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The sync service as run by the server.
pub type Service = SyncService<AnyStore>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub config: Arc<Config>,
    pub conn_manager: Arc<ConnectionManager>,
}

impl AppState {
    /// Build state around a service, publishing its changes to WebSocket
    /// subscribers.
    pub fn new(service: Service, config: Config) -> Self {
        let conn_manager = ConnectionManager::new_shared();
        let service = service.with_listener(conn_manager.clone());
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            conn_manager,
        }
    }
}

/// Build the application router with tracing and CORS layers.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
