//! Request history abstraction.
//!
//! The dispatcher only needs positional access ("the song playing now",
//! "the one before it") to rewrite `/current` and `/prev` switches. Queue
//! and history bookkeeping live with the song-request logic, behind this
//! trait.

use crate::error::HistoryError;

pub mod memory;

pub use memory::MemoryHistory;

/// Positional read access to recently played songs, most recent first.
pub trait SongHistory: Send + Sync {
    /// Version identifier of the song at `position` (0 = most recent).
    ///
    /// `Err(OutOfRange)` when there is no song at that position;
    /// `Ok(None)` when the song exists but carries no version.
    fn version_at(&self, position: usize) -> Result<Option<String>, HistoryError>;
}
