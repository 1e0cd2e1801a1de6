//! Bookmark record types.
//!
//! [`BookmarkRecord`] is what the store holds. [`BookmarkDraft`] is what
//! clients send: every field is optional on the wire, and validation turns a
//! draft into a record.

use crate::{error::Result, Error, RecordId, Token};
use serde::{Deserialize, Deserializer, Serialize};

/// Format of server-assigned creation timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The current UTC time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One saved URL with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    /// Unique within the owning token's set
    pub id: RecordId,
    pub url: String,
    pub category: String,
    /// Hashtags in the order the user entered them
    #[serde(default, deserialize_with = "decode::hashtags")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "decode::pinned")]
    pub pinned: bool,
    /// Creation time, never changed after the record is stored
    #[serde(default)]
    pub timestamp: String,
    /// Owning token, stamped by bulk replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl BookmarkRecord {
    /// Create an unpinned record with no hashtags.
    pub fn new(
        id: impl Into<RecordId>,
        url: impl Into<String>,
        category: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            category: category.into(),
            hashtags: Vec::new(),
            pinned: false,
            timestamp: timestamp.into(),
            token: None,
        }
    }

    /// Builder-style hashtag setter.
    pub fn with_hashtags<I, T>(mut self, hashtags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.hashtags = hashtags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style pinned setter.
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Whether the record carries `tag`, ignoring case and a leading `#`.
    pub fn has_hashtag(&self, tag: &str) -> bool {
        let wanted = strip_hash(tag);
        self.hashtags
            .iter()
            .any(|h| strip_hash(h).eq_ignore_ascii_case(wanted))
    }
}

fn strip_hash(tag: &str) -> &str {
    tag.trim().trim_start_matches('#')
}

/// Inbound bookmark data as sent by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDraft {
    #[serde(default, deserialize_with = "decode::id")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "decode::hashtags")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "decode::pinned")]
    pub pinned: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl BookmarkDraft {
    /// Create a draft with the two required fields.
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    /// Builder-style id setter.
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style hashtag setter.
    pub fn with_hashtags<I, T>(mut self, hashtags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.hashtags = hashtags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style pinned setter.
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Builder-style timestamp setter.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Validate the draft and build a record.
    ///
    /// `url` and `category` must be present and non-blank. A missing id is
    /// replaced with a fresh UUID and a missing timestamp with `now`.
    pub fn into_record(self, now: &str) -> Result<BookmarkRecord> {
        let url = required(self.url, "url")?;
        let category = required(self.category, "category")?;
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            Some(_) => return Err(Error::validation("id must not be blank")),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let timestamp = self
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| now.to_string());

        Ok(BookmarkRecord {
            id,
            url,
            category,
            hashtags: self.hashtags,
            pinned: self.pinned,
            timestamp,
            token: None,
        })
    }

    /// The draft's id, required for in-place updates.
    pub fn require_id(&self) -> Result<&str> {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(Error::validation("id is required")),
        }
    }
}

impl From<BookmarkRecord> for BookmarkDraft {
    fn from(record: BookmarkRecord) -> Self {
        Self {
            id: Some(record.id),
            url: Some(record.url),
            category: Some(record.category),
            hashtags: record.hashtags,
            pinned: record.pinned,
            timestamp: Some(record.timestamp),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::validation(format!("{} is required", field))),
    }
}

/// Lenient field decoders.
///
/// Bookmark sets have passed through spreadsheets and CSV files, so the same
/// field shows up with different JSON types.
mod decode {
    use super::*;
    use serde_json::Value;

    pub fn hashtags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn pinned<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            ),
            _ => false,
        })
    }

    pub fn id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}
