//! Filtering of a token's bookmarks.
//!
//! Plain substring and equality matching. Results keep the set's order;
//! there is no ranking.

use crate::BookmarkRecord;
use serde::Deserialize;

/// Search criteria. Every present criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring of url, category, or any hashtag
    #[serde(default, alias = "q")]
    pub text: Option<String>,
    /// Case-insensitive category equality
    #[serde(default)]
    pub category: Option<String>,
    /// Hashtag, with or without the leading `#`
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

impl SearchQuery {
    /// Query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn hashtag(mut self, hashtag: impl Into<String>) -> Self {
        self.hashtag = Some(hashtag.into());
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// Whether `record` satisfies every criterion.
    pub fn matches(&self, record: &BookmarkRecord) -> bool {
        if let Some(text) = non_blank(&self.text) {
            let needle = text.to_lowercase();
            let hit = record.url.to_lowercase().contains(&needle)
                || record.category.to_lowercase().contains(&needle)
                || record
                    .hashtags
                    .iter()
                    .any(|h| h.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = non_blank(&self.category) {
            if !record.category.trim().eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }

        if let Some(hashtag) = non_blank(&self.hashtag) {
            if !record.has_hashtag(hashtag) {
                return false;
            }
        }

        match self.pinned {
            Some(pinned) => record.pinned == pinned,
            None => true,
        }
    }

    /// Keep the matching records, in order.
    pub fn filter(&self, records: Vec<BookmarkRecord>) -> Vec<BookmarkRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
