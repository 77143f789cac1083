//! Process-wide logical clock.
//!
//! Every replacer in the process draws access timestamps from the same
//! counter. It starts at zero and only ever moves forward by one per
//! [`tick`], so two accesses never share a timestamp.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::typedef::Timestamp;

static LOGICAL_CLOCK: AtomicU64 = AtomicU64::new(0);

/// Returns the current timestamp and advances the clock.
pub fn tick() -> Timestamp {
    LOGICAL_CLOCK.fetch_add(1, Ordering::SeqCst)
}

/// Returns the next timestamp [`tick`] would hand out, without advancing.
///
/// Every timestamp already handed out is strictly smaller than this value.
pub fn now() -> Timestamp {
    LOGICAL_CLOCK.load(Ordering::SeqCst)
}
