//! # marksync engine
//!
//! Token-scoped bookmark sync for personal bookmark managers.
//!
//! A client owns an opaque **token**. Every bookmark it saves lands in the
//! ordered set stored under that token, and any device that knows the token
//! sees the same set. This crate holds everything below the HTTP layer:
//! the record model, validation, token generation, storage backends, and the
//! [`SyncService`] tying them together.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`BookmarkRecord`] is one saved URL with a category, hashtags, a pinned
//! flag, and an immutable creation timestamp. Clients send
//! [`BookmarkDraft`]s, which are validated into records.
//!
//! ### Stores
//!
//! The [`Store`] trait maps a token to its records. Backends:
//! - [`MemoryStore`] - process-local, for tests and ephemeral servers
//! - [`TableFileStore`] - every token in one JSON table file
//! - [`DirectoryStore`] - one JSON file per token
//!
//! File backends never rewrite a live file in place: they write a temporary
//! file and atomically rename it over the old one.
//!
//! ### Sync Service
//!
//! [`SyncService`] exposes save, get, update, bulk replace, pin toggling,
//! search, and token generation. Mutations of the same token are serialized;
//! different tokens proceed independently. A [`ChangeListener`] sees every
//! committed set in write order.
//!
//! ## Quick Start
//!
//! ```rust
//! use marksync_engine::{BookmarkDraft, MemoryStore, SyncService};
//!
//! let service = SyncService::new(MemoryStore::new());
//! let token = service.generate_token().unwrap();
//!
//! service
//!     .save_url(
//!         &token,
//!         BookmarkDraft::new("https://www.rust-lang.org", "tech").with_hashtags(["#rust"]),
//!     )
//!     .unwrap();
//!
//! let bookmarks = service.get_urls(&token).unwrap();
//! assert_eq!(bookmarks.len(), 1);
//! assert!(!bookmarks[0].pinned);
//! ```

pub mod change;
pub mod error;
pub mod lock;
pub mod record;
pub mod search;
pub mod service;
pub mod store;
pub mod token;

// Re-export main types at crate root
pub use change::{ChangeListener, SetChange};
pub use error::Error;
pub use lock::TokenLocks;
pub use record::{now_timestamp, BookmarkDraft, BookmarkRecord, TIMESTAMP_FORMAT};
pub use search::SearchQuery;
pub use service::SyncService;
pub use store::{AnyStore, DirectoryStore, MemoryStore, RecoveryPolicy, Store, TableFileStore};
pub use token::{validate_token, OsRandomSource, TokenGenerator, TokenSource};

/// Type aliases for clarity
pub type Token = String;
pub type RecordId = String;
