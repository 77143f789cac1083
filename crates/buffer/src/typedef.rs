/// Index of a frame slot in the buffer pool.
pub type FrameId = usize;

/// Logical timestamp handed out by [`crate::clock`].
pub type Timestamp = u64;
