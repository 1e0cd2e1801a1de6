//! Configuration management for the server.

use marksync_engine::RecoveryPolicy;
use std::env;
use std::path::PathBuf;

/// Default location of the single-file table.
pub const DEFAULT_TABLE_PATH: &str = "data/bookmarks.json";

/// Default root of the one-file-per-token store.
pub const DEFAULT_DIRECTORY_PATH: &str = "data/tokens";

/// Which storage backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local; everything is lost on restart
    Memory,
    /// Every token in one JSON table file
    Table,
    /// One JSON file per token
    Directory,
}

impl StoreKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "table" => Ok(StoreKind::Table),
            "directory" | "dir" => Ok(StoreKind::Directory),
            other => Err(ConfigError::InvalidStore(other.to_string())),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Storage backend
    pub store: StoreKind,
    /// Table file or token directory, depending on `store`
    pub data_path: PathBuf,
    /// Handling of corrupt persisted sets
    pub recovery: RecoveryPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let store = match lookup("MARKSYNC_STORE") {
            Some(value) => StoreKind::parse(&value)?,
            None => StoreKind::Table,
        };

        let data_path = lookup("MARKSYNC_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| match store {
                StoreKind::Directory => PathBuf::from(DEFAULT_DIRECTORY_PATH),
                _ => PathBuf::from(DEFAULT_TABLE_PATH),
            });

        let recovery = match lookup("MARKSYNC_RECOVERY").as_deref().map(str::trim) {
            None | Some("strict") => RecoveryPolicy::Strict,
            Some("lenient") => RecoveryPolicy::Lenient,
            Some(other) => return Err(ConfigError::InvalidRecovery(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            store,
            data_path,
            recovery,
        })
    }

    /// Configuration for an in-memory server, used by tests.
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            store: StoreKind::Memory,
            data_path: PathBuf::new(),
            recovery: RecoveryPolicy::Strict,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid MARKSYNC_STORE value '{0}' (expected memory, table or directory)")]
    InvalidStore(String),

    #[error("Invalid MARKSYNC_RECOVERY value '{0}' (expected strict or lenient)")]
    InvalidRecovery(String),
}
