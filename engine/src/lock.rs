//! Per-token mutual exclusion.
//!
//! Mutations of one token's set are read-modify-write sequences. Running two
//! of them concurrently on the same token would lose an update, so each token
//! gets its own mutex. Different tokens never wait on each other.

use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Lock table keyed by token.
///
/// Entries exist only while some caller holds or waits for them.
#[derive(Debug, Default)]
pub struct TokenLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TokenLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `token`.
    pub fn with_lock<T>(&self, token: &str, f: impl FnOnce() -> T) -> T {
        let lock = self
            .locks
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        drop(lock);
        // Only the table's own reference left means nobody else is waiting.
        self.locks
            .remove_if(token, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Number of tokens with a live lock entry.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}
