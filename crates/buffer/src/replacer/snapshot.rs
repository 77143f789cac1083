use std::fmt;

use rustdb_error::errdata;
use serde::{Deserialize, Serialize};

use super::KDistance;
use crate::typedef::{FrameId, Timestamp};
use crate::Result;

/// Point-in-time view of one tracked frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame_id: FrameId,
    pub is_evictable: bool,
    /// Retained access timestamps, oldest first.
    pub history: Vec<Timestamp>,
    pub k_distance: KDistance,
}

/// Point-in-time view of a whole replacer, taken under its latch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacerSnapshot {
    pub capacity: usize,
    pub k: usize,
    /// Clock reading the k-distances were computed against.
    pub now: Timestamp,
    pub evictable_count: usize,
    /// Tracked frames sorted by frame id.
    pub frames: Vec<FrameSnapshot>,
}

impl ReplacerSnapshot {
    pub fn frame(&self, frame_id: FrameId) -> Option<&FrameSnapshot> {
        self.frames
            .binary_search_by_key(&frame_id, |frame| frame.frame_id)
            .ok()
            .map(|idx| &self.frames[idx])
    }

    /// Checks the cached evictable count and the shape of every history.
    pub fn check_invariants(&self) -> Result<()> {
        let evictable = self.frames.iter().filter(|f| f.is_evictable).count();
        if evictable != self.evictable_count {
            return errdata!(
                "evictable count is {} but {} frames are evictable",
                self.evictable_count,
                evictable
            );
        }

        for frame in &self.frames {
            if frame.history.is_empty() {
                return errdata!("frame {} has an empty history", frame.frame_id);
            }
            if frame.history.len() > self.k {
                return errdata!(
                    "frame {} retains {} timestamps, more than k = {}",
                    frame.frame_id,
                    frame.history.len(),
                    self.k
                );
            }
            if !frame.history.windows(2).all(|w| w[0] < w[1]) {
                return errdata!("frame {} history is not increasing", frame.frame_id);
            }
            if frame.history.iter().any(|&ts| ts >= self.now) {
                return errdata!("frame {} history is ahead of the clock", frame.frame_id);
            }
        }
        Ok(())
    }
}

impl fmt::Display for ReplacerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "replacer k={} capacity={} now={} evictable={}",
            self.k, self.capacity, self.now, self.evictable_count
        )?;
        for frame in &self.frames {
            let history: Vec<String> = frame.history.iter().map(|ts| ts.to_string()).collect();
            let distance = match frame.k_distance {
                KDistance::Finite(d) => d.to_string(),
                KDistance::Infinite => "inf".to_string(),
            };
            writeln!(
                f,
                "  frame {}: evictable={} k-distance={} history=[{}]",
                frame.frame_id,
                frame.is_evictable,
                distance,
                history.join(" ")
            )?;
        }
        Ok(())
    }
}
