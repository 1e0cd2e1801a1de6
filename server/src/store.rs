//! Storage backend selection.

use crate::config::{Config, StoreKind};
use marksync_engine::{AnyStore, DirectoryStore, MemoryStore, TableFileStore};

/// Open the backend named by the configuration.
pub fn open_store(config: &Config) -> Result<AnyStore, marksync_engine::Error> {
    let store = match config.store {
        StoreKind::Memory => AnyStore::from(MemoryStore::new()),
        StoreKind::Table => TableFileStore::open(&config.data_path, config.recovery)?.into(),
        StoreKind::Directory => DirectoryStore::open(&config.data_path, config.recovery)?.into(),
    };
    Ok(store)
}
