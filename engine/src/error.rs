//! Error types for the marksync engine.

use thiserror::Error;

/// All possible errors from the marksync engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed required fields, or a malformed token.
    #[error("validation error: {0}")]
    Validation(String),

    /// The targeted token set or record id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Token generation kept colliding with existing tokens.
    #[error("token collision after {attempts} attempts")]
    Collision { attempts: u32 },

    /// Persistence failed: I/O, encoding, or corrupt stored data.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub(crate) fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("encoding failed: {}", err))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
