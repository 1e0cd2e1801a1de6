//! Store - durable persistence of token sets.
//!
//! A store maps a token to the ordered sequence of bookmark records saved
//! under it. All backends implement the same [`Store`] capability, so the
//! sync service never knows which one it is talking to.

mod directory;
mod file;
mod memory;
mod table;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use table::{TableFileStore, TABLE_FORMAT_VERSION};

use crate::{error::Result, BookmarkRecord};
use std::sync::Arc;

/// Capability required by the sync service.
///
/// Every mutating call must leave the backing persistence consistent and
/// must never expose a partially written set to concurrent readers.
pub trait Store: Send + Sync {
    /// The token's set, or `None` if the token has never been written.
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>>;

    /// Replace the token's entire set, creating it if needed.
    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()>;

    /// Append one record to the token's set, creating it if needed.
    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()>;

    /// The token's set; empty if the token is unknown.
    fn get(&self, token: &str) -> Result<Vec<BookmarkRecord>> {
        Ok(self.load(token)?.unwrap_or_default())
    }

    /// Whether the token has a set, even an empty one.
    fn contains(&self, token: &str) -> Result<bool> {
        Ok(self.load(token)?.is_some())
    }
}

/// What to do when a persisted set cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Surface the corruption as a storage error.
    #[default]
    Strict,
    /// Log and treat the set as empty; the next write replaces it.
    Lenient,
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        (**self).load(token)
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        (**self).replace_all(token, records)
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        (**self).append_one(token, record)
    }

    fn contains(&self, token: &str) -> Result<bool> {
        (**self).contains(token)
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        (**self).load(token)
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        (**self).replace_all(token, records)
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        (**self).append_one(token, record)
    }

    fn contains(&self, token: &str) -> Result<bool> {
        (**self).contains(token)
    }
}

/// One of the built-in backends, chosen at startup.
#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    Table(TableFileStore),
    Directory(DirectoryStore),
}

impl AnyStore {
    /// Short backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnyStore::Memory(_) => "memory",
            AnyStore::Table(_) => "table",
            AnyStore::Directory(_) => "directory",
        }
    }
}

impl Store for AnyStore {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        match self {
            AnyStore::Memory(s) => s.load(token),
            AnyStore::Table(s) => s.load(token),
            AnyStore::Directory(s) => s.load(token),
        }
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        match self {
            AnyStore::Memory(s) => s.replace_all(token, records),
            AnyStore::Table(s) => s.replace_all(token, records),
            AnyStore::Directory(s) => s.replace_all(token, records),
        }
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        match self {
            AnyStore::Memory(s) => s.append_one(token, record),
            AnyStore::Table(s) => s.append_one(token, record),
            AnyStore::Directory(s) => s.append_one(token, record),
        }
    }

    fn contains(&self, token: &str) -> Result<bool> {
        match self {
            AnyStore::Memory(s) => s.contains(token),
            AnyStore::Table(s) => s.contains(token),
            AnyStore::Directory(s) => s.contains(token),
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}

impl From<TableFileStore> for AnyStore {
    fn from(store: TableFileStore) -> Self {
        AnyStore::Table(store)
    }
}

impl From<DirectoryStore> for AnyStore {
    fn from(store: DirectoryStore) -> Self {
        AnyStore::Directory(store)
    }
}
