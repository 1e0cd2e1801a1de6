//! In-memory store, used as a test double and for ephemeral servers.

use super::Store;
use crate::{error::Result, BookmarkRecord, Token};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Token sets held in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<HashMap<Token, Vec<BookmarkRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens with a set.
    pub fn token_count(&self) -> usize {
        self.sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Store for MemoryStore {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        let sets = self.sets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sets.get(token).cloned())
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        let mut sets = self.sets.write().unwrap_or_else(PoisonError::into_inner);
        sets.insert(token.to_string(), records);
        Ok(())
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        let mut sets = self.sets.write().unwrap_or_else(PoisonError::into_inner);
        sets.entry(token.to_string()).or_default().push(record);
        Ok(())
    }

    fn contains(&self, token: &str) -> Result<bool> {
        let sets = self.sets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sets.contains_key(token))
    }
}
