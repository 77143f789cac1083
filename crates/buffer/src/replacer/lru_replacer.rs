use std::collections::HashMap;

use log::{debug, trace};
use parking_lot::Mutex;
use rustdb_error::errop;

use super::snapshot::{FrameSnapshot, ReplacerSnapshot};
use super::{AccessType, KDistance, Replacer};
use crate::clock;
use crate::typedef::{FrameId, Timestamp};
use crate::Result;

#[derive(Debug)]
struct LruNode {
    frame_id: FrameId,
    is_evictable: bool,
    last_accessed_timestamp: Timestamp,
}

#[derive(Debug)]
struct LruState {
    node_store: HashMap<FrameId, LruNode>,
    evictable_count: usize, // Tracks evictable nodes
}

/// Classic least-recently-used replacement.
///
/// Evicts the evictable frame whose last access is oldest. Selects the same
/// victims as an [`crate::LrukReplacer`] with `k == 1`.
#[derive(Debug)]
pub struct LruReplacer {
    state: Mutex<LruState>,
    capacity: usize,
}

impl LruReplacer {
    pub fn new(capacity: usize) -> Self {
        LruReplacer {
            state: Mutex::new(LruState {
                node_store: HashMap::with_capacity(capacity),
                evictable_count: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshot(&self) -> ReplacerSnapshot {
        let state = self.state.lock();
        let now = clock::now();
        let mut frames: Vec<FrameSnapshot> = state
            .node_store
            .values()
            .map(|node| FrameSnapshot {
                frame_id: node.frame_id,
                is_evictable: node.is_evictable,
                history: vec![node.last_accessed_timestamp],
                k_distance: KDistance::Finite(now.saturating_sub(node.last_accessed_timestamp)),
            })
            .collect();
        frames.sort_by_key(|frame| frame.frame_id);

        ReplacerSnapshot {
            capacity: self.capacity,
            k: 1,
            now,
            evictable_count: state.evictable_count,
            frames,
        }
    }
}

impl Replacer for LruReplacer {
    /// Records an access and updates the timestamp.
    /// If the frame_id is new, create a new node.
    fn record_access(&self, frame_id: FrameId, access_type: AccessType) {
        let mut state = self.state.lock();
        let timestamp = clock::tick();
        state
            .node_store
            .entry(frame_id)
            .and_modify(|node| node.last_accessed_timestamp = timestamp)
            .or_insert(LruNode {
                frame_id,
                is_evictable: false,
                last_accessed_timestamp: timestamp,
            });
        trace!("frame {frame_id} accessed at {timestamp} ({access_type:?})");
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        let mut state = self.state.lock();
        let LruState {
            node_store,
            evictable_count,
        } = &mut *state;

        if let Some(node) = node_store.get_mut(&frame_id) {
            if node.is_evictable != evictable {
                node.is_evictable = evictable;
                if evictable {
                    *evictable_count += 1;
                } else {
                    *evictable_count -= 1;
                }
            }
        }
    }

    /// Evicts the least recently used evictable frame.
    fn evict(&self) -> Option<FrameId> {
        let mut state = self.state.lock();
        let frame_id = state
            .node_store
            .values()
            .filter(|node| node.is_evictable)
            .min_by_key(|node| node.last_accessed_timestamp)
            .map(|node| node.frame_id)?;

        state.node_store.remove(&frame_id);
        state.evictable_count -= 1;
        debug!("evicted frame {frame_id} ({} evictable left)", state.evictable_count);
        Some(frame_id)
    }

    /// Removes a frame from LRU entirely.
    fn remove(&self, frame_id: FrameId) -> Result<()> {
        let mut state = self.state.lock();
        let Some(is_evictable) = state.node_store.get(&frame_id).map(|node| node.is_evictable)
        else {
            return Ok(());
        };
        if !is_evictable {
            return errop!("cannot remove frame {frame_id}: frame is not evictable");
        }

        state.node_store.remove(&frame_id);
        state.evictable_count -= 1;
        debug!("removed frame {frame_id}");
        Ok(())
    }

    /// Returns the number of evictable frames.
    fn evictable_count(&self) -> usize {
        self.state.lock().evictable_count
    }
}
