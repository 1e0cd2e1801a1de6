//! Directory store: one JSON file per token.

use super::file::{decode_set, read_optional, write_atomic};
use super::{RecoveryPolicy, Store};
use crate::{error::Result, token::validate_token, BookmarkRecord, Error};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const EXTENSION: &str = "json";

/// Each token's set lives in `<dir>/<token>.json`.
#[derive(Debug)]
pub struct DirectoryStore {
    dir: PathBuf,
    policy: RecoveryPolicy,
    write_lock: Mutex<()>,
}

impl DirectoryStore {
    /// Open the store rooted at `dir`, creating the directory if missing.
    pub fn open(dir: impl Into<PathBuf>, policy: RecoveryPolicy) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            policy,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn set_path(&self, token: &str) -> Result<PathBuf> {
        // Tokens become file names; never let one escape the directory.
        validate_token(token)?;
        Ok(self.dir.join(format!("{}.{}", token, EXTENSION)))
    }

    fn read_set(&self, token: &str, path: &Path) -> Result<Option<Vec<BookmarkRecord>>> {
        let Some(bytes) = read_optional(path)? else {
            return Ok(None);
        };

        let raw = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(raw) => raw,
            Err(e) => match self.policy {
                RecoveryPolicy::Strict => {
                    return Err(Error::storage(format!(
                        "corrupt bookmark file {}: {}",
                        path.display(),
                        e
                    )))
                }
                RecoveryPolicy::Lenient => serde_json::Value::Null,
            },
        };
        decode_set(token, raw, self.policy).map(Some)
    }

    fn write_set(&self, path: &Path, records: &[BookmarkRecord]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        write_atomic(path, &bytes)
    }
}

impl Store for DirectoryStore {
    fn load(&self, token: &str) -> Result<Option<Vec<BookmarkRecord>>> {
        let path = self.set_path(token)?;
        self.read_set(token, &path)
    }

    fn replace_all(&self, token: &str, records: Vec<BookmarkRecord>) -> Result<()> {
        let path = self.set_path(token)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_set(&path, &records)
    }

    fn append_one(&self, token: &str, record: BookmarkRecord) -> Result<()> {
        let path = self.set_path(token)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut set = self.read_set(token, &path)?.unwrap_or_default();
        set.push(record);
        self.write_set(&path, &set)
    }

    fn contains(&self, token: &str) -> Result<bool> {
        Ok(self.set_path(token)?.is_file())
    }
}
