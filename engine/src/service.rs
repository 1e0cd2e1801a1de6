//! Sync service - token-scoped bookmark operations over a [`Store`].
//!
//! The service validates input, enforces per-set invariants (distinct ids,
//! immutable creation time), and serializes every mutation of a token
//! through [`TokenLocks`]. Reads go straight to the store.
//!
//! The `*_from` variants of the mutating operations carry a source label
//! through to the attached [`ChangeListener`].

use crate::{
    change::{ChangeListener, SetChange},
    error::Result,
    lock::TokenLocks,
    now_timestamp,
    store::Store,
    token::validate_token,
    BookmarkDraft, BookmarkRecord, Error, SearchQuery, Token, TokenGenerator,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Message for updates targeting a token with no set.
pub const TOKEN_NOT_FOUND: &str = "Token not found";

/// Message for updates targeting an id missing from the set.
pub const URL_NOT_FOUND: &str = "URL not found";

/// Bookmark sync operations for any store backend.
#[derive(Debug)]
pub struct SyncService<S> {
    store: S,
    locks: TokenLocks,
    tokens: TokenGenerator,
    clock: fn() -> String,
    listener: Option<Arc<dyn ChangeListener>>,
}

impl<S: Store> SyncService<S> {
    /// Create a service over `store` with the default token generator.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: TokenLocks::new(),
            tokens: TokenGenerator::new(),
            clock: now_timestamp,
            listener: None,
        }
    }

    /// Replace the token generator.
    pub fn with_token_generator(mut self, tokens: TokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replace the clock used for creation timestamps.
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    /// Publish every committed change to `listener`.
    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save one bookmark under `token`, creating the set on first use.
    ///
    /// Returns the stored record with its assigned id and timestamp.
    pub fn save_url(&self, token: &str, draft: BookmarkDraft) -> Result<BookmarkRecord> {
        self.save_url_from(token, draft, None)
    }

    /// [`save_url`](Self::save_url), attributing the change to `source`.
    pub fn save_url_from(
        &self,
        token: &str,
        draft: BookmarkDraft,
        source: Option<&str>,
    ) -> Result<BookmarkRecord> {
        validate_token(token)?;
        let record = draft.into_record(&(self.clock)())?;

        self.locks.with_lock(token, || {
            let mut existing = self.store.get(token)?;
            if existing.iter().any(|r| r.id == record.id) {
                return Err(Error::validation(format!(
                    "a bookmark with id {} already exists",
                    record.id
                )));
            }

            self.store.append_one(token, record.clone())?;
            tracing::info!(token = %token, id = %record.id, "saved bookmark");

            if self.listener.is_some() {
                existing.push(record.clone());
                self.publish(token, source, &existing);
            }
            Ok(record)
        })
    }

    /// The token's bookmarks, in insertion order. Unknown tokens yield an
    /// empty list.
    pub fn get_urls(&self, token: &str) -> Result<Vec<BookmarkRecord>> {
        validate_token(token)?;
        let records = self.store.get(token)?;
        tracing::debug!(token = %token, count = records.len(), "loaded bookmarks");
        Ok(records)
    }

    /// Replace the record whose id matches `draft.id`, keeping its position
    /// and its original creation time.
    ///
    /// Never appends: an unknown token or id is a not-found error and the
    /// store is left untouched.
    pub fn update_url(&self, token: &str, draft: BookmarkDraft) -> Result<BookmarkRecord> {
        self.update_url_from(token, draft, None)
    }

    /// [`update_url`](Self::update_url), attributing the change to `source`.
    pub fn update_url_from(
        &self,
        token: &str,
        draft: BookmarkDraft,
        source: Option<&str>,
    ) -> Result<BookmarkRecord> {
        validate_token(token)?;
        draft.require_id()?;
        let mut updated = draft.into_record(&(self.clock)())?;

        self.locks.with_lock(token, || {
            let mut set = self
                .store
                .load(token)?
                .ok_or_else(|| Error::not_found(TOKEN_NOT_FOUND))?;

            let slot = set
                .iter_mut()
                .find(|r| r.id == updated.id)
                .ok_or_else(|| Error::not_found(URL_NOT_FOUND))?;

            updated.timestamp = slot.timestamp.clone();
            updated.token = slot.token.clone();
            *slot = updated.clone();

            self.commit(token, set, source)?;
            tracing::info!(token = %token, id = %updated.id, "updated bookmark");
            Ok(updated)
        })
    }

    /// Discard the token's set and store `drafts` as the new set.
    ///
    /// Every record gets `token` stamped on it. Any invalid draft or
    /// duplicate id fails the whole call before anything is written.
    pub fn bulk_replace(&self, token: &str, drafts: Vec<BookmarkDraft>) -> Result<usize> {
        self.bulk_replace_from(token, drafts, None)
    }

    /// [`bulk_replace`](Self::bulk_replace), attributing the change to
    /// `source`.
    pub fn bulk_replace_from(
        &self,
        token: &str,
        drafts: Vec<BookmarkDraft>,
        source: Option<&str>,
    ) -> Result<usize> {
        validate_token(token)?;
        let now = (self.clock)();

        let mut seen = HashSet::with_capacity(drafts.len());
        let mut records = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let mut record = draft
                .into_record(&now)
                .map_err(|e| Error::validation(format!("record {}: {}", index, e)))?;
            if !seen.insert(record.id.clone()) {
                return Err(Error::validation(format!(
                    "duplicate bookmark id {}",
                    record.id
                )));
            }
            record.token = Some(token.to_string());
            records.push(record);
        }

        let count = records.len();
        self.locks
            .with_lock(token, || self.commit(token, records, source))?;
        tracing::info!(token = %token, count, "replaced bookmark set");
        Ok(count)
    }

    /// Flip the pinned flag of one bookmark and return the new value.
    pub fn toggle_pin(&self, token: &str, id: &str) -> Result<bool> {
        self.toggle_pin_from(token, id, None)
    }

    /// [`toggle_pin`](Self::toggle_pin), attributing the change to `source`.
    pub fn toggle_pin_from(&self, token: &str, id: &str, source: Option<&str>) -> Result<bool> {
        validate_token(token)?;

        self.locks.with_lock(token, || {
            let mut set = self
                .store
                .load(token)?
                .ok_or_else(|| Error::not_found(TOKEN_NOT_FOUND))?;

            let record = set
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Error::not_found(URL_NOT_FOUND))?;
            record.pinned = !record.pinned;
            let pinned = record.pinned;

            self.commit(token, set, source)?;
            tracing::info!(token = %token, id = %id, pinned, "toggled pin");
            Ok(pinned)
        })
    }

    /// Write `set` as the token's whole set and publish it.
    ///
    /// Must be called with the token's lock held.
    fn commit(&self, token: &str, set: Vec<BookmarkRecord>, source: Option<&str>) -> Result<()> {
        if self.listener.is_none() {
            return self.store.replace_all(token, set);
        }

        self.store.replace_all(token, set.clone())?;
        self.publish(token, source, &set);
        Ok(())
    }

    fn publish(&self, token: &str, source: Option<&str>, bookmarks: &[BookmarkRecord]) {
        if let Some(listener) = &self.listener {
            listener.set_changed(SetChange {
                token,
                source,
                bookmarks,
            });
        }
    }

    /// The token's bookmarks matching `query`, in insertion order.
    pub fn search(&self, token: &str, query: &SearchQuery) -> Result<Vec<BookmarkRecord>> {
        Ok(query.filter(self.get_urls(token)?))
    }

    /// The token's pinned bookmarks.
    pub fn pinned(&self, token: &str) -> Result<Vec<BookmarkRecord>> {
        self.search(token, &SearchQuery::new().pinned(true))
    }

    /// A fresh token not currently used by any set in the store.
    pub fn generate_token(&self) -> Result<Token> {
        let token = self.tokens.generate(|candidate| self.store.contains(candidate))?;
        tracing::info!("generated sync token");
        Ok(token)
    }
}
