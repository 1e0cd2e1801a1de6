//! Single-file store holding every token's set in one JSON table.

use super::file::{decode_set, read_optional, write_atomic};
use super::{RecoveryPolicy, Store};
use crate::{error::Result, BookmarkRecord, Error, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Version of the table document format.
pub const TABLE_FORMAT_VERSION: u32 = 1;

/// On-disk shape of the table.
///
/// Sets are kept as raw JSON so one corrupt set does not make every other
/// token unreadable. BTreeMap keeps the file ordering deterministic.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableDocument {
    format_version: u32,
    sets: BTreeMap<Token, serde_json::Value>,
}

impl TableDocument {
    fn empty() -> Self {
        Self {
            format_version: TABLE_FORMAT_VERSION,
            sets: BTreeMap::new(),
        }
    }
}

/// All token sets in one JSON document, rewritten atomically on each change.
#[derive(Debug)]
pub struct TableFileStore {
    path: PathBuf,
    policy: RecoveryPolicy,
    write_lock: Mutex<()>,
}

impl TableFileStore {
    /// Open (or prepare to create) the table at `path`.
    ///
    /// The parent directory is created if missing; the file itself is only
    /// written on the first mutation.
    pub fn open(path: impl Into<PathBuf>, policy: RecoveryPolicy) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path,
            policy,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<TableDocument> {
        let Some(bytes) = read_optional(&self.path)? else {
            return Ok(TableDocument::empty());
        };

        // A table that does not parse at all is never treated as empty,
        // whatever the recovery policy.
        let doc: TableDocument = serde_json::from_slice(&bytes).map_err(|e| {
            Error::storage(format!("corrupt table {}: {}", self.path.display(), e))
        })?;

        if doc.format_version > TABLE_FORMAT_VERSION {
            return Err(Error::storage(format!(
                "unsupported table format version {}",
                doc.format_version
            )));
        }
        Ok(doc)
    }

    fn write_document(&self, doc: &TableDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        write_atomic(&self.path, &bytes)
    }

    /// Read-modify-write of one token's set under the writer lock.
    fn mutate<F>(&self, token: &str, f: F) -> Result<()>
    where
        F: FnOnce(Vec<BookmarkRecord>) -> Vec<BookmarkRecord>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.read_document()?;
        let current = match doc.sets.remove(token) {
            Some(raw) => decode_set(token, raw, self.policy)?,
            None => Vec::new(),
        };

        let updated = f(current);
        doc.sets
            .insert(token.to_string(), serde_json::to_value(updated)?);
        self.write_document(&doc)
    }
}

impl Store for TableFileStore {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        let mut doc = self.read_document()?;
        match doc.sets.remove(token) {
            Some(raw) => Ok(Some(decode_set(token, raw, self.policy)?)),
            None => Ok(None),
        }
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        // The replaced set is discarded, so a corrupt one must not block it.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.read_document()?;
        doc.sets
            .insert(token.to_string(), serde_json::to_value(records)?);
        self.write_document(&doc)
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        self.mutate(token, |mut set| {
            set.push(record);
            set
        })
    }

    fn contains(&self, token: &str) -> Result<bool> {
        Ok(self.read_document()?.sets.contains_key(token))
    }
}
