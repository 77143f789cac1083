use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::typedef::FrameId;
use crate::Result;

pub mod lru_k_replacer;
pub mod lru_replacer;
pub mod snapshot;

/// Classification of an access, as reported by the buffer pool.
///
/// The baseline policies ignore it; it exists so that scan-aware variants can
/// be plugged in without changing the buffer pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    #[default]
    Unknown,
    Lookup,
    Scan,
    Index,
}

/// Backward k-distance of a frame.
///
/// `Infinite` orders above every finite distance, so the largest distance is
/// always the preferred victim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KDistance {
    Finite(u64),
    Infinite,
}

impl KDistance {
    pub fn is_infinite(&self) -> bool {
        matches!(self, KDistance::Infinite)
    }
}

/// A frame replacement policy.
///
/// Every method takes `&self`: implementations serialize calls internally, so
/// a single replacer can be shared between threads behind an `Arc`.
pub trait Replacer: Send + Sync + Debug {
    /// Record the event that the given frame id is accessed at the current timestamp.
    /// Create a new, non-evictable entry if frame id has not been seen before.
    fn record_access(&self, frame_id: FrameId, access_type: AccessType);

    /// Toggle whether a frame may be chosen by [`Replacer::evict`].
    /// Unknown frames are ignored.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool);

    /// Attempts to evict a frame based on the replacement policy.
    /// Returns `Some(frame_id)` if a frame was evicted, otherwise `None`.
    fn evict(&self) -> Option<FrameId>;

    /// Removes a frame and its history regardless of its rank.
    ///
    /// Removing an unknown frame is a no-op. Removing a frame that is not
    /// evictable fails with [`rustdb_error::Error::InvalidOperation`].
    fn remove(&self, frame_id: FrameId) -> Result<()>;

    /// Returns the number of evictable frames in the replacer.
    fn evictable_count(&self) -> usize;

    /// Marks a frame as pinned, preventing it from being evicted.
    fn pin(&self, frame_id: FrameId) {
        self.set_evictable(frame_id, false);
    }

    /// Marks a frame as unpinned, making it eligible for eviction.
    fn unpin(&self, frame_id: FrameId) {
        self.set_evictable(frame_id, true);
    }
}
