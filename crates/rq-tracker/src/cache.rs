//! In-memory status cache keyed by title.
//!
//! Entries never expire; they are only removed by explicit invalidation after
//! a request or cancel. The full [`StatusRecord`] is stored so that a cache hit
//! still carries the `request_id` needed to cancel.

use dashmap::DashMap;
use rq_core::{MediaRef, StatusRecord};

/// Unbounded, non-expiring map from title to its last resolved status.
///
/// Concurrent writers for the same key are not coordinated; the last write
/// wins.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: DashMap<MediaRef, StatusRecord>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, media: &MediaRef) -> Option<StatusRecord> {
        self.entries.get(media).map(|entry| *entry.value())
    }

    pub fn insert(&self, media: MediaRef, record: StatusRecord) {
        self.entries.insert(media, record);
    }

    /// Remove the entry for `media`. Returns whether an entry existed.
    pub fn invalidate(&self, media: &MediaRef) -> bool {
        self.entries.remove(media).is_some()
    }

    /// Titles whose cached record references `request_id`.
    pub fn refs_for_request(&self, request_id: u64) -> Vec<MediaRef> {
        self.entries
            .iter()
            .filter(|entry| entry.value().request_id == Some(request_id))
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
