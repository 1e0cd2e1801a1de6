//! Change notification hook.
//!
//! A [`ChangeListener`] attached to the sync service sees every committed
//! mutation while the token's lock is still held, so listeners observe a
//! token's changes in exactly the order they were written.

use crate::BookmarkRecord;
use std::fmt;

/// One committed change to a token's set.
#[derive(Debug, Clone, Copy)]
pub struct SetChange<'a> {
    pub token: &'a str,
    /// Client-chosen label of the device that made the change
    pub source: Option<&'a str>,
    /// The whole set after the change
    pub bookmarks: &'a [BookmarkRecord],
}

/// Receives committed changes.
///
/// Called with the token's lock held: implementations must not block and
/// must not call back into the service for the same token.
pub trait ChangeListener: Send + Sync + fmt::Debug {
    fn set_changed(&self, change: SetChange<'_>);
}
