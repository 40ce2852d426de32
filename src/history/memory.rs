//! In-memory request history.

use super::SongHistory;
use crate::error::HistoryError;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// One played song as far as the router cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedSong {
    pub title: String,
    pub version: Option<String>,
}

/// Bounded most-recent-first history.
#[derive(Debug)]
pub struct MemoryHistory {
    songs: RwLock<VecDeque<PlayedSong>>,
    capacity: usize,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            songs: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Record a song as the most recent one, dropping the oldest entry when
    /// full.
    pub fn push(&self, song: PlayedSong) {
        let mut songs = self.songs.write();
        songs.push_front(song);
        songs.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.songs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.read().is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SongHistory for MemoryHistory {
    fn version_at(&self, position: usize) -> Result<Option<String>, HistoryError> {
        self.songs
            .read()
            .get(position)
            .map(|song| song.version.clone())
            .ok_or(HistoryError::OutOfRange(position))
    }
}
