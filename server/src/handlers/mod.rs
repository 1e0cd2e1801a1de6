//! Request handlers for bookmark and sync operations.
//!
//! The engine is synchronous and touches the filesystem, so every service
//! call runs on tokio's blocking pool. WebSocket subscribers are notified by
//! the service itself as each change commits.

mod sync;
mod urls;
mod websocket;

pub use sync::*;
pub use urls::*;
pub use websocket::*;

use crate::error::{AppError, Result};
use crate::Service;
use std::sync::Arc;

/// Run a service call on the blocking pool.
pub async fn run_blocking<T, F>(service: &Arc<Service>, f: F) -> Result<T>
where
    F: FnOnce(&Service) -> marksync_engine::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Reject a missing or blank token.
pub(crate) fn require_token(token: Option<String>) -> Result<String> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
        _ => Err(AppError::BadRequest("Token is required".to_string())),
    }
}
