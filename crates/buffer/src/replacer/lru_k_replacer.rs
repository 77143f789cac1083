use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

use log::{debug, trace, warn};
use parking_lot::Mutex;
use rustdb_error::errop;

use super::snapshot::{FrameSnapshot, ReplacerSnapshot};
use super::{AccessType, KDistance, Replacer};
use crate::clock;
use crate::config::ReplacerConfig;
use crate::typedef::{FrameId, Timestamp};
use crate::Result;

/// Represents a node in the LrukReplacer, maintaining access history and evictability status.
#[derive(Debug)]
struct LrukNode {
    frame_id: FrameId,
    is_evictable: bool,
    history: VecDeque<Timestamp>, // Stores the last K access timestamps, oldest first
    k: usize,
}

impl LrukNode {
    /// Creates an LrukNode, which is not evictable by default.
    fn new(frame_id: FrameId, k: usize) -> Self {
        Self {
            frame_id,
            is_evictable: false,
            history: VecDeque::with_capacity(k),
            k,
        }
    }

    /// Checks if the node has an infinite backward K-distance.
    fn has_inf_backward_k_dist(&self) -> bool {
        self.history.len() < self.k
    }

    /// Gets the earliest retained timestamp.
    ///
    /// With fewer than K accesses this is the first access ever recorded;
    /// otherwise it is the K-th most recent one.
    fn earliest_timestamp(&self) -> Timestamp {
        self.history[0]
    }

    /// Calculates the backward K-distance of this node.
    fn backward_k_distance(&self, now: Timestamp) -> KDistance {
        if self.has_inf_backward_k_dist() {
            KDistance::Infinite
        } else {
            KDistance::Finite(now.saturating_sub(self.earliest_timestamp()))
        }
    }

    /// Inserts a new access timestamp, maintaining the last K timestamps.
    fn insert_history_timestamp(&mut self, timestamp: Timestamp) {
        assert!(self.history.back().map_or(true, |&last| timestamp > last));
        self.history.push_back(timestamp);
        if self.history.len() > self.k {
            self.history.pop_front();
        }
    }

    fn to_snapshot(&self, now: Timestamp) -> FrameSnapshot {
        FrameSnapshot {
            frame_id: self.frame_id,
            is_evictable: self.is_evictable,
            history: self.history.iter().copied().collect(),
            k_distance: self.backward_k_distance(now),
        }
    }
}

/// State guarded by the replacer latch.
#[derive(Debug)]
struct LrukState {
    node_store: HashMap<FrameId, LrukNode>,
    evictable_size: usize, // Number of evictable nodes
}

impl LrukState {
    /// Picks the evictable frame with the largest backward k-distance.
    ///
    /// Frames with infinite distance beat every finite one; among them the one
    /// whose first access is oldest wins. Timestamps are unique, so the
    /// earliest timestamp also settles any remaining tie.
    fn victim(&self, now: Timestamp) -> Option<FrameId> {
        self.node_store
            .values()
            .filter(|node| node.is_evictable)
            .max_by_key(|node| {
                (
                    node.backward_k_distance(now),
                    Reverse(node.earliest_timestamp()),
                )
            })
            .map(|node| node.frame_id)
    }

    /// Drops a node and its history, keeping the evictable count in sync.
    fn remove_node(&mut self, frame_id: FrameId) -> Option<LrukNode> {
        let node = self.node_store.remove(&frame_id)?;
        if node.is_evictable {
            self.evictable_size -= 1;
        }
        Some(node)
    }
}

/// Implements the LRU-K replacement policy.
///
/// Every operation holds the replacer latch for its whole duration, so the
/// candidate scan in [`Replacer::evict`] always sees a consistent view of all
/// histories and evictable flags.
#[derive(Debug)]
pub struct LrukReplacer {
    state: Mutex<LrukState>,
    capacity: usize, // Number of frames the buffer pool manages
    k: usize,        // Number of accesses to track
}

impl LrukReplacer {
    /// Creates a new LRU-K replacer instance.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero. Use [`LrukReplacer::try_from_config`] for
    /// user-supplied parameters.
    pub fn new(capacity: usize, k: usize) -> Self {
        assert!(k > 0, "LRU-K replacer requires k >= 1");
        LrukReplacer {
            state: Mutex::new(LrukState {
                node_store: HashMap::with_capacity(capacity),
                evictable_size: 0,
            }),
            capacity,
            k,
        }
    }

    /// Creates a replacer from a validated configuration.
    pub fn try_from_config(config: &ReplacerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.capacity, config.k))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of tracked frames, evictable or not.
    pub fn tracked_count(&self) -> usize {
        self.state.lock().node_store.len()
    }

    /// Returns whether the frame is evictable, or `None` if it is not tracked.
    pub fn is_evictable(&self, frame_id: FrameId) -> Option<bool> {
        self.state
            .lock()
            .node_store
            .get(&frame_id)
            .map(|node| node.is_evictable)
    }

    /// Returns the retained access history of a frame, oldest first.
    pub fn history(&self, frame_id: FrameId) -> Option<Vec<Timestamp>> {
        self.state
            .lock()
            .node_store
            .get(&frame_id)
            .map(|node| node.history.iter().copied().collect())
    }

    /// Returns the frame [`Replacer::evict`] would pick right now, without evicting it.
    pub fn peek_victim(&self) -> Option<FrameId> {
        let state = self.state.lock();
        state.victim(clock::now())
    }

    /// Captures every tracked frame, sorted by frame id.
    pub fn snapshot(&self) -> ReplacerSnapshot {
        let state = self.state.lock();
        let now = clock::now();
        let mut frames: Vec<FrameSnapshot> = state
            .node_store
            .values()
            .map(|node| node.to_snapshot(now))
            .collect();
        frames.sort_by_key(|frame| frame.frame_id);

        ReplacerSnapshot {
            capacity: self.capacity,
            k: self.k,
            now,
            evictable_count: state.evictable_size,
            frames,
        }
    }

    /// Verifies the cached evictable count and every history against the records.
    pub fn check_invariants(&self) -> Result<()> {
        self.snapshot().check_invariants()
    }
}

impl Replacer for LrukReplacer {
    /// Records access to a frame and updates its history.
    fn record_access(&self, frame_id: FrameId, access_type: AccessType) {
        if frame_id >= self.capacity {
            warn!(
                "frame {frame_id} is outside the replacer capacity {}",
                self.capacity
            );
        }

        let mut state = self.state.lock();
        // taken under the latch so that each history stays strictly increasing
        let timestamp = clock::tick();
        let k = self.k;
        let node = state
            .node_store
            .entry(frame_id)
            .or_insert_with(|| LrukNode::new(frame_id, k));
        node.insert_history_timestamp(timestamp);

        trace!("frame {frame_id} accessed at {timestamp} ({access_type:?})");
    }

    /// Toggles whether a tracked frame may be evicted.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        let mut state = self.state.lock();
        let LrukState {
            node_store,
            evictable_size,
        } = &mut *state;

        let Some(node) = node_store.get_mut(&frame_id) else {
            return;
        };
        if node.is_evictable == evictable {
            return;
        }

        node.is_evictable = evictable;
        if evictable {
            *evictable_size += 1;
        } else {
            *evictable_size -= 1;
        }
        trace!("frame {frame_id} evictable = {evictable}");
    }

    /// Evicts the frame with the largest backward k-distance.
    fn evict(&self) -> Option<FrameId> {
        let mut state = self.state.lock();
        if state.evictable_size == 0 {
            return None;
        }

        let now = clock::now();
        let frame_id = state.victim(now)?;
        let node = state.remove_node(frame_id)?;
        debug!(
            "evicted frame {frame_id} (k-distance {:?}, {} evictable left)",
            node.backward_k_distance(now),
            state.evictable_size
        );
        Some(frame_id)
    }

    /// Removes a frame from the replacer if it is evictable.
    fn remove(&self, frame_id: FrameId) -> Result<()> {
        let mut state = self.state.lock();
        let Some(is_evictable) = state.node_store.get(&frame_id).map(|node| node.is_evictable)
        else {
            return Ok(());
        };
        if !is_evictable {
            return errop!("cannot remove frame {frame_id}: frame is not evictable");
        }

        state.remove_node(frame_id);
        debug!("removed frame {frame_id}");
        Ok(())
    }

    /// Returns the number of evictable frames.
    fn evictable_count(&self) -> usize {
        self.state.lock().evictable_size
    }
}
