//! Bookmark handlers - save, list, update, pin, and search one token's set.

use super::{require_token, run_blocking};
use crate::error::{AppError, Result};
use crate::AppState;
use marksync_engine::{BookmarkDraft, BookmarkRecord, SearchQuery};
use serde::{Deserialize, Serialize};

/// Query parameters naming a token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Request body for saving or updating a bookmark.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRequest {
    pub token: Option<String>,
    pub url_data: Option<BookmarkDraft>,
    /// Label of the device making the change, echoed to subscribers
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for toggling a bookmark's pin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub token: Option<String>,
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub token: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

impl SearchParams {
    fn into_parts(self) -> Result<(String, SearchQuery)> {
        let token = require_token(self.token)?;
        let query = SearchQuery {
            text: self.q,
            category: self.category,
            hashtag: self.hashtag,
            pinned: self.pinned,
        };
        Ok((token, query))
    }
}

/// Acknowledgment returned by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            pinned: None,
            count: None,
        }
    }
}

impl UrlRequest {
    fn into_parts(self) -> Result<(String, BookmarkDraft, Option<String>)> {
        match (self.token, self.url_data) {
            (Some(token), Some(draft)) if !token.trim().is_empty() => {
                Ok((token.trim().to_string(), draft, self.source))
            }
            _ => Err(AppError::BadRequest(
                "Token and URL data are required".to_string(),
            )),
        }
    }
}

/// List a token's bookmarks.
pub async fn handle_get_urls(state: &AppState, query: TokenQuery) -> Result<Vec<BookmarkRecord>> {
    let token = require_token(query.token)?;
    run_blocking(&state.service, move |svc| svc.get_urls(&token)).await
}

/// Save one bookmark.
pub async fn handle_save_url(state: &AppState, request: UrlRequest) -> Result<SuccessResponse> {
    let (token, draft, source) = request.into_parts()?;

    run_blocking(&state.service, move |svc| {
        svc.save_url_from(&token, draft, source.as_deref())
    })
    .await?;

    Ok(SuccessResponse::ok())
}

/// Update one bookmark in place.
pub async fn handle_update_url(state: &AppState, request: UrlRequest) -> Result<SuccessResponse> {
    let (token, draft, source) = request.into_parts()?;

    run_blocking(&state.service, move |svc| {
        svc.update_url_from(&token, draft, source.as_deref())
    })
    .await?;

    Ok(SuccessResponse::ok())
}

/// Toggle a bookmark's pinned flag.
pub async fn handle_toggle_pin(state: &AppState, request: PinRequest) -> Result<SuccessResponse> {
    let token = require_token(request.token)?;
    let id = match request.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(AppError::BadRequest("Bookmark id is required".to_string())),
    };

    let source = request.source;
    let pinned = run_blocking(&state.service, move |svc| {
        svc.toggle_pin_from(&token, &id, source.as_deref())
    })
    .await?;

    Ok(SuccessResponse {
        pinned: Some(pinned),
        ..SuccessResponse::ok()
    })
}

/// Search a token's bookmarks.
pub async fn handle_search(state: &AppState, params: SearchParams) -> Result<Vec<BookmarkRecord>> {
    let (token, query) = params.into_parts()?;
    run_blocking(&state.service, move |svc| svc.search(&token, &query)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_request_requires_both_fields() {
        let request: UrlRequest = serde_json::from_value(json!({"token": "abc"})).unwrap();
        assert!(request.into_parts().is_err());

        let request: UrlRequest =
            serde_json::from_value(json!({"urlData": {"url": "u", "category": "c"}})).unwrap();
        assert!(request.into_parts().is_err());

        let request: UrlRequest = serde_json::from_value(json!({
            "token": "abc",
            "urlData": {"url": "u", "category": "c"},
            "source": "phone"
        }))
        .unwrap();
        let (token, draft, source) = request.into_parts().unwrap();
        assert_eq!(token, "abc");
        assert_eq!(draft.url.as_deref(), Some("u"));
        assert_eq!(source.as_deref(), Some("phone"));
    }

    #[test]
    fn search_params_map_to_query() {
        let params = SearchParams {
            token: Some("abc".into()),
            q: Some("rust".into()),
            category: None,
            hashtag: Some("#lang".into()),
            pinned: Some(true),
        };
        let (token, query) = params.into_parts().unwrap();
        assert_eq!(token, "abc");
        assert_eq!(query, SearchQuery::new().text("rust").hashtag("#lang").pinned(true));
    }

    #[test]
    fn success_response_shape() {
        let value = serde_json::to_value(SuccessResponse::ok()).unwrap();
        assert_eq!(value, json!({"success": true}));
    }
}
