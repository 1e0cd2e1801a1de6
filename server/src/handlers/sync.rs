//! Sync handlers - token minting and whole-set exchange.

use super::{require_token, run_blocking, SuccessResponse};
use crate::error::{AppError, Result};
use crate::AppState;
use axum::body::Bytes;
use marksync_engine::{BookmarkDraft, BookmarkRecord};
use serde::{Deserialize, Serialize};

/// Query parameters for the sync endpoint.
#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    pub action: Option<String>,
    pub token: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Supported sync actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    GenerateToken,
    Get,
    Update,
}

impl SyncAction {
    pub fn parse(action: Option<&str>) -> Result<Self> {
        match action.map(str::trim) {
            Some("generate_token") => Ok(SyncAction::GenerateToken),
            Some("get") => Ok(SyncAction::Get),
            Some("update") => Ok(SyncAction::Update),
            Some(other) if !other.is_empty() => {
                Err(AppError::BadRequest(format!("Invalid action: {}", other)))
            }
            _ => Err(AppError::BadRequest("Action is required".to_string())),
        }
    }
}

/// Response for `generate_token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Result of a sync action.
#[derive(Debug)]
pub enum SyncOutcome {
    Token(TokenResponse),
    Bookmarks(Vec<BookmarkRecord>),
    Replaced(SuccessResponse),
}

/// Dispatch a sync request.
///
/// `body` is only read by `update`, where it must be a JSON array of
/// records that replaces the token's whole set.
pub async fn handle_sync(state: &AppState, query: SyncQuery, body: Bytes) -> Result<SyncOutcome> {
    match SyncAction::parse(query.action.as_deref())? {
        SyncAction::GenerateToken => {
            let token = run_blocking(&state.service, |svc| svc.generate_token()).await?;
            tracing::info!("Issued new sync token");
            Ok(SyncOutcome::Token(TokenResponse { token }))
        }
        SyncAction::Get => {
            let token = require_token(query.token)?;
            let bookmarks = run_blocking(&state.service, move |svc| svc.get_urls(&token)).await?;
            Ok(SyncOutcome::Bookmarks(bookmarks))
        }
        SyncAction::Update => {
            let token = require_token(query.token)?;
            let drafts = parse_drafts(&body)?;

            let source = query.source;
            let count = run_blocking(&state.service, move |svc| {
                svc.bulk_replace_from(&token, drafts, source.as_deref())
            })
            .await?;

            tracing::debug!(count, "Replaced bookmark set");
            Ok(SyncOutcome::Replaced(SuccessResponse {
                count: Some(count),
                ..SuccessResponse::ok()
            }))
        }
    }
}

fn parse_drafts(body: &[u8]) -> Result<Vec<BookmarkDraft>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest(
            "Request body must be a JSON array of bookmarks".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid bookmark list: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(
            SyncAction::parse(Some("generate_token")).unwrap(),
            SyncAction::GenerateToken
        );
        assert_eq!(SyncAction::parse(Some("get")).unwrap(), SyncAction::Get);
        assert_eq!(SyncAction::parse(Some("update")).unwrap(), SyncAction::Update);
    }

    #[test]
    fn rejects_unknown_or_missing_action() {
        assert!(SyncAction::parse(Some("delete")).is_err());
        assert!(SyncAction::parse(Some("")).is_err());
        assert!(SyncAction::parse(None).is_err());
    }

    #[test]
    fn draft_body_must_be_an_array() {
        assert!(parse_drafts(b"").is_err());
        assert!(parse_drafts(b"{\"url\": \"x\"}").is_err());

        let drafts = parse_drafts(br#"[{"url": "http://a.com", "category": "tech"}]"#).unwrap();
        assert_eq!(drafts.len(), 1);
        assert!(parse_drafts(b"[]").unwrap().is_empty());
    }
}
