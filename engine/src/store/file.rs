//! Helpers shared by the file-backed stores.

use super::RecoveryPolicy;
use crate::{error::Result, BookmarkRecord, Error};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Write `data` to `path` without ever rewriting the live file in place.
///
/// 1. Write to a temporary file next to the target
/// 2. Sync the temporary file to disk
/// 3. Rename it over the target
/// 4. Sync the directory so the rename itself is durable
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::storage(format!(
            "failed to write {}: {}",
            temp_path.display(),
            e
        )));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::storage(format!("failed to replace {}: {}", path.display(), e))
    })?;

    if let Some(dir) = path.parent() {
        sync_directory(dir)?;
    }
    Ok(())
}

/// Read a whole file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::storage(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Decode one token's persisted set under the given recovery policy.
pub(crate) fn decode_set(
    token: &str,
    raw: serde_json::Value,
    policy: RecoveryPolicy,
) -> Result<Vec<BookmarkRecord>> {
    match serde_json::from_value::<Vec<BookmarkRecord>>(raw) {
        Ok(records) => Ok(records),
        Err(e) => match policy {
            RecoveryPolicy::Strict => Err(Error::storage(format!(
                "corrupt bookmark set for token {}: {}",
                token, e
            ))),
            RecoveryPolicy::Lenient => {
                tracing::warn!(token = %token, error = %e, "discarding corrupt bookmark set");
                Ok(Vec::new())
            }
        },
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> Result<()> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> Result<()> {
    // NTFS journals metadata; directories cannot be fsynced the same way
    Ok(())
}
